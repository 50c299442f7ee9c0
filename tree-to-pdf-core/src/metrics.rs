//! Text measurement for the builtin Helvetica face.
//!
//! The renderer draws every page with printpdf's builtin Helvetica under
//! `WinAnsiEncoding`, so wrap decisions are made against the same advance
//! widths (Adobe core font metrics, 1/1000 em) over the same character set:
//! printable ASCII, Latin-1 and the Windows-1252 punctuation block.

use std::fmt;

use crate::contract::TextMeasure;

const FIRST_GLYPH: char = ' ';
const LAST_GLYPH: char = '~';
const FIRST_LATIN1: char = '\u{a0}';
const LAST_LATIN1: char = '\u{ff}';

/// Advance widths for U+0020 ..= U+007E.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0 - 9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A - Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a - z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

/// Advance widths for U+00A0 ..= U+00FF, which WinAnsi maps onto itself.
#[rustfmt::skip]
const LATIN1_WIDTHS: [u16; 96] = [
    // nbsp ¡ ¢ £ ¤ ¥ ¦ § ¨ © ª « ¬ shy ® ¯
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // ° ± ² ³ ´ µ ¶ · ¸ ¹ º » ¼ ½ ¾ ¿
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // À Á Â Ã Ä Å Æ Ç È É Ê Ë Ì Í Î Ï
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // Ð Ñ Ò Ó Ô Õ Ö × Ø Ù Ú Û Ü Ý Þ ß
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // à á â ã ä å æ ç è é ê ë ì í î ï
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // ð ñ ò ó ô õ ö ÷ ø ù ú û ü ý þ ÿ
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// The Windows-1252 block 0x80 ..= 0x9F: (character, code, width).
#[rustfmt::skip]
const WIN_ANSI_EXTRAS: [(char, u8, u16); 27] = [
    ('\u{20ac}', 0x80, 556),  // €
    ('\u{201a}', 0x82, 222),  // ‚
    ('\u{0192}', 0x83, 556),  // ƒ
    ('\u{201e}', 0x84, 333),  // „
    ('\u{2026}', 0x85, 1000), // …
    ('\u{2020}', 0x86, 556),  // †
    ('\u{2021}', 0x87, 556),  // ‡
    ('\u{02c6}', 0x88, 333),  // ˆ
    ('\u{2030}', 0x89, 1000), // ‰
    ('\u{0160}', 0x8a, 667),  // Š
    ('\u{2039}', 0x8b, 333),  // ‹
    ('\u{0152}', 0x8c, 1000), // Œ
    ('\u{017d}', 0x8e, 611),  // Ž
    ('\u{2018}', 0x91, 222),  // ‘
    ('\u{2019}', 0x92, 222),  // ’
    ('\u{201c}', 0x93, 333),  // “
    ('\u{201d}', 0x94, 333),  // ”
    ('\u{2022}', 0x95, 350),  // •
    ('\u{2013}', 0x96, 556),  // –
    ('\u{2014}', 0x97, 1000), // —
    ('\u{02dc}', 0x98, 333),  // ˜
    ('\u{2122}', 0x99, 1000), // ™
    ('\u{0161}', 0x9a, 500),  // š
    ('\u{203a}', 0x9b, 333),  // ›
    ('\u{0153}', 0x9c, 944),  // œ
    ('\u{017e}', 0x9e, 500),  // ž
    ('\u{0178}', 0x9f, 667),  // Ÿ
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// The face has no glyph for this character.
    UnsupportedGlyph { ch: char },
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::UnsupportedGlyph { ch } => write!(
                f,
                "Helvetica has no glyph for {:?} (U+{:04X})",
                ch, *ch as u32
            ),
        }
    }
}

impl std::error::Error for MetricsError {}

/// Builtin Helvetica metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Helvetica;

impl Helvetica {
    /// Advance width of a single character in 1/1000 em.
    pub fn glyph_width(ch: char) -> Result<u16, MetricsError> {
        if (FIRST_GLYPH..=LAST_GLYPH).contains(&ch) {
            return Ok(HELVETICA_WIDTHS[(ch as u32 - FIRST_GLYPH as u32) as usize]);
        }
        if (FIRST_LATIN1..=LAST_LATIN1).contains(&ch) {
            return Ok(LATIN1_WIDTHS[(ch as u32 - FIRST_LATIN1 as u32) as usize]);
        }
        WIN_ANSI_EXTRAS
            .iter()
            .find(|(c, _, _)| *c == ch)
            .map(|&(_, _, width)| width)
            .ok_or(MetricsError::UnsupportedGlyph { ch })
    }
}

/// Byte `ch` is drawn with under `WinAnsiEncoding`.
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    if (FIRST_GLYPH..=LAST_GLYPH).contains(&ch) || (FIRST_LATIN1..=LAST_LATIN1).contains(&ch) {
        return u8::try_from(u32::from(ch)).ok();
    }
    WIN_ANSI_EXTRAS
        .iter()
        .find(|(c, _, _)| *c == ch)
        .map(|&(_, code, _)| code)
}

impl TextMeasure for Helvetica {
    fn text_width(&self, text: &str, font_size: f32) -> Result<f32, MetricsError> {
        let mut units: u64 = 0;
        for ch in text.chars() {
            units += u64::from(Self::glyph_width(ch)?);
        }
        Ok(units as f32 * font_size / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_known_widths() {
        // H e l l o = 722 + 556 + 222 + 222 + 556
        let width = Helvetica.text_width("Hello", 10.0).unwrap();
        assert!((width - 22.78).abs() < 1e-4, "got {width}");
        assert_eq!(Helvetica.text_width("", 8.0).unwrap(), 0.0);
    }

    #[test]
    fn digits_share_one_width() {
        for d in '0'..='9' {
            assert_eq!(Helvetica::glyph_width(d).unwrap(), 556);
        }
    }

    #[test]
    fn measures_latin1_and_windows_punctuation() {
        // © space 2 0 2 4 space — space c a f é
        let expected = 737 + 278 + 4 * 556 + 278 + 1000 + 278 + 500 + 556 + 278 + 556;
        let width = Helvetica.text_width("\u{a9} 2024 \u{2014} caf\u{e9}", 8.0).unwrap();
        assert!((width - expected as f32 * 8.0 / 1000.0).abs() < 1e-3, "got {width}");
        assert_eq!(Helvetica::glyph_width('\u{201c}').unwrap(), 333);
        assert_eq!(Helvetica::glyph_width('\u{fc}').unwrap(), 556);
    }

    #[test]
    fn encodes_the_same_set_it_measures() {
        assert_eq!(win_ansi_byte('A'), Some(b'A'));
        assert_eq!(win_ansi_byte('\u{e9}'), Some(0xe9));
        assert_eq!(win_ansi_byte('\u{2014}'), Some(0x97));
        assert_eq!(win_ansi_byte('\u{20ac}'), Some(0x80));
        assert_eq!(win_ansi_byte('\u{2603}'), None);
        for ch in (' '..='\u{ff}').chain(WIN_ANSI_EXTRAS.iter().map(|(c, _, _)| *c)) {
            assert_eq!(
                Helvetica::glyph_width(ch).is_ok(),
                win_ansi_byte(ch).is_some(),
                "{ch:?}"
            );
        }
    }

    #[test]
    fn long_tokens_do_not_overflow() {
        let token = "W".repeat(5_000_000);
        let width = Helvetica.text_width(&token, 1.0).unwrap();
        assert!((width - 4_720_000.0).abs() < 1.0, "got {width}");
    }

    #[test]
    fn rejects_characters_outside_win_ansi() {
        assert_eq!(
            Helvetica.text_width("snow\u{2603}", 8.0),
            Err(MetricsError::UnsupportedGlyph { ch: '\u{2603}' })
        );
        assert!(Helvetica.text_width("a\tb", 8.0).is_err());
        assert!(Helvetica.text_width("\u{7f}", 8.0).is_err());
    }
}
