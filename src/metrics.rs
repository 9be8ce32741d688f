//! Base-14 font metrics.
//!
//! Advance widths come from the Adobe AFM files of the standard PDF fonts,
//! in 1/1000 em, for every character the WinAnsi encoding can show. Text
//! layout only needs widths, so measuring never touches a drawing surface.

use serde::{Deserialize, Serialize};

/// Points to millimetres.
pub const PT_TO_MM: f32 = 25.4 / 72.0;

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * PT_TO_MM
}

/// Font family as named in the layout config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    #[serde(rename = "Times-Roman", alias = "Times")]
    Times,
    #[serde(rename = "Helvetica")]
    Helvetica,
    #[serde(rename = "Courier")]
    Courier,
}

impl FontFamily {
    pub fn regular(self) -> Face {
        match self {
            FontFamily::Times => Face::TimesRoman,
            FontFamily::Helvetica => Face::Helvetica,
            FontFamily::Courier => Face::Courier,
        }
    }

    pub fn bold(self) -> Face {
        match self {
            FontFamily::Times => Face::TimesBold,
            FontFamily::Helvetica => Face::HelveticaBold,
            FontFamily::Courier => Face::CourierBold,
        }
    }
}

/// A concrete base-14 face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    TimesRoman,
    TimesBold,
    Helvetica,
    HelveticaBold,
    Courier,
    CourierBold,
}

impl Face {
    /// PostScript name of the face.
    pub fn name(self) -> &'static str {
        match self {
            Face::TimesRoman => "Times-Roman",
            Face::TimesBold => "Times-Bold",
            Face::Helvetica => "Helvetica",
            Face::HelveticaBold => "Helvetica-Bold",
            Face::Courier => "Courier",
            Face::CourierBold => "Courier-Bold",
        }
    }

    /// ASCII table and column in `winansi_widths` for proportional faces.
    fn table(self) -> Option<(&'static [u16; 95], usize)> {
        match self {
            Face::TimesRoman => Some((&TIMES_ROMAN, 0)),
            Face::TimesBold => Some((&TIMES_BOLD, 1)),
            Face::Helvetica => Some((&HELVETICA, 2)),
            Face::HelveticaBold => Some((&HELVETICA_BOLD, 3)),
            Face::Courier | Face::CourierBold => None,
        }
    }

    fn fallback_width(self) -> u16 {
        match self {
            Face::TimesRoman | Face::TimesBold => 500,
            Face::Helvetica | Face::HelveticaBold => 556,
            Face::Courier | Face::CourierBold => 600,
        }
    }

    /// Advance width of one character in 1/1000 em.
    pub fn char_width(self, c: char) -> u16 {
        let Some((table, column)) = self.table() else {
            // Courier is monospaced.
            return 600;
        };
        if let Some(widths) = winansi_widths(c) {
            return widths[column];
        }
        let c = fold_latin1(c);
        match c as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            _ => self.fallback_width(),
        }
    }
}

/// Width of `text` in millimetres when set in `face` at `size` points.
pub fn string_width(text: &str, face: Face, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| face.char_width(c) as u32).sum();
    pt_to_mm(units as f32 * size / 1000.0)
}

/// Accented Latin-1 letters share the advance width of their base letter.
fn fold_latin1(c: char) -> char {
    match c {
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        '\u{a0}' => ' ',
        other => other,
    }
}

/// Widths of the non-letter WinAnsi characters outside ASCII, as
/// [Times-Roman, Times-Bold, Helvetica, Helvetica-Bold].
#[rustfmt::skip]
fn winansi_widths(c: char) -> Option<[u16; 4]> {
    let widths = match c {
        '–'             => [500, 500, 556, 556],
        '—' | '…' | '‰' => [1000, 1000, 1000, 1000],
        '‘' | '’' | '‚' => [333, 333, 222, 278],
        '“' | '”' | '„' => [444, 500, 333, 500],
        '•'             => [350, 350, 350, 350],
        '†' | '‡' | '€' | 'ƒ' => [500, 500, 556, 556],
        '™'             => [980, 1000, 1000, 1000],
        'ˆ' | '˜' | '‹' | '›' => [333, 333, 333, 333],
        'Œ'             => [889, 1000, 1000, 1000],
        'œ'             => [722, 722, 944, 944],
        'Š'             => [556, 556, 667, 667],
        'š'             => [389, 389, 500, 556],
        'Ž'             => [611, 667, 611, 611],
        'ž'             => [444, 444, 500, 500],
        'Ÿ'             => [722, 722, 667, 667],
        '¡'             => [333, 333, 333, 333],
        '¢' | '£' | '¤' | '¥' | '§' | '«' | '»' => [500, 500, 556, 556],
        '¦'             => [200, 220, 260, 280],
        '¨' | '¯' | '´' | '¸' | '\u{ad}' => [333, 333, 333, 333],
        '©' | '®'       => [760, 747, 737, 737],
        'ª'             => [276, 300, 370, 370],
        'º'             => [310, 330, 365, 365],
        '¬' | '±' | '×' | '÷' => [564, 570, 584, 584],
        '°'             => [400, 400, 400, 400],
        '¹' | '²' | '³' => [300, 300, 333, 333],
        'µ'             => [500, 556, 556, 611],
        '¶'             => [453, 540, 537, 556],
        '·'             => [250, 250, 278, 278],
        '¼' | '½' | '¾' => [750, 750, 834, 834],
        '¿'             => [444, 500, 611, 611],
        'Æ'             => [889, 1000, 1000, 1000],
        'æ'             => [667, 722, 889, 889],
        'Ð'             => [722, 722, 722, 722],
        'ð'             => [500, 500, 556, 611],
        'Þ'             => [556, 611, 667, 667],
        'þ'             => [500, 556, 556, 611],
        'ß'             => [500, 556, 611, 611],
        _ => return None,
    };
    Some(widths)
}

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    // 0-9
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    // : ; < = > ? @
    278, 278, 564, 564, 564, 444, 921,
    // A-Z
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    // [ \ ] ^ _ `
    333, 278, 333, 469, 500, 333,
    // a-z
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    // { | } ~
    480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_times_widths() {
        assert_eq!(Face::TimesRoman.char_width(' '), 250);
        assert_eq!(Face::TimesRoman.char_width('A'), 722);
        assert_eq!(Face::TimesRoman.char_width('z'), 444);
        assert_eq!(Face::TimesRoman.char_width('~'), 541);
        assert_eq!(Face::TimesBold.char_width('W'), 1000);
    }

    #[test]
    fn test_accented_letters_use_base_width() {
        assert_eq!(Face::TimesRoman.char_width('ä'), Face::TimesRoman.char_width('a'));
        assert_eq!(Face::Helvetica.char_width('Ö'), Face::Helvetica.char_width('O'));
    }

    #[test]
    fn test_winansi_punctuation_widths() {
        assert_eq!(Face::TimesRoman.char_width('—'), 1000);
        assert_eq!(Face::TimesRoman.char_width('…'), 1000);
        assert_eq!(Face::TimesRoman.char_width('–'), 500);
        assert_eq!(Face::Helvetica.char_width('’'), 222);
        assert_eq!(Face::HelveticaBold.char_width('“'), 500);
        assert_eq!(Face::TimesBold.char_width('™'), 1000);
        assert_eq!(Face::Helvetica.char_width('ß'), 611);
        assert_eq!(Face::TimesRoman.char_width('°'), 400);
        assert_eq!(Face::Courier.char_width('—'), 600);
    }

    #[test]
    fn test_every_winansi_character_has_a_width() {
        let extras = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";
        let latin1 = (0xa0..=0xffu32).filter_map(char::from_u32);
        for c in extras.chars().chain(latin1) {
            assert!(
                winansi_widths(c).is_some() || fold_latin1(c).is_ascii(),
                "no width for {:?}",
                c
            );
        }
    }

    #[test]
    fn test_courier_is_monospaced() {
        assert_eq!(string_width("iiii", Face::Courier, 10.0), string_width("MMMM", Face::Courier, 10.0));
    }

    #[test]
    fn test_string_width_scales_with_size() {
        let w9 = string_width("Plantago lanceolata", Face::TimesRoman, 9.0);
        let w18 = string_width("Plantago lanceolata", Face::TimesRoman, 18.0);
        assert!((w18 - 2.0 * w9).abs() < 1e-4);
        // "Family" in Times-Roman: 556+444+778+278+278+500 = 2834 units
        let expected = pt_to_mm(2834.0 * 7.0 / 1000.0);
        assert!((string_width("Family", Face::TimesRoman, 7.0) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_empty_string_has_zero_width() {
        assert_eq!(string_width("", Face::Helvetica, 12.0), 0.0);
    }

    #[test]
    fn test_family_faces() {
        assert_eq!(FontFamily::Times.regular().name(), "Times-Roman");
        assert_eq!(FontFamily::Times.bold().name(), "Times-Bold");
        assert_eq!(FontFamily::Helvetica.bold(), Face::HelveticaBold);
    }
}
