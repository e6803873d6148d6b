use unicode_normalization::UnicodeNormalization;

/// Replacement for a single typographic variant
enum Canonical {
    Char(char),
    Str(&'static str),
    Keep,
}

fn canonical(c: char) -> Canonical {
    match c {
        // hyphen, non-breaking hyphen, figure dash, en/em dash, horizontal bar, minus sign
        '\u{2010}'..='\u{2015}' | '\u{2212}' => Canonical::Char('-'),
        '\u{2018}'..='\u{201B}' => Canonical::Char('\''),
        '\u{201C}'..='\u{201F}' | '\u{00AB}' | '\u{00BB}' => Canonical::Char('"'),
        '\u{2026}' => Canonical::Str("..."),
        '\u{00A0}' | '\u{2000}'..='\u{200B}' | '\u{202F}' | '\u{205F}' | '\u{3000}' => {
            Canonical::Char(' ')
        }
        '\u{00D7}' => Canonical::Char('x'),
        '\u{00F7}' => Canonical::Char('/'),
        '\u{2022}' | '\u{2219}' => Canonical::Char('*'),
        _ => Canonical::Keep,
    }
}

/// Canonicalize typographic variants and compose the result (NFC).
///
/// Generated target text and typed input must both pass through here before
/// they are compared, otherwise positions drift apart. Idempotent.
pub fn normalize(text: &str) -> String {
    let mut substituted = String::with_capacity(text.len());
    for c in text.chars() {
        match canonical(c) {
            Canonical::Char(replacement) => substituted.push(replacement),
            Canonical::Str(replacement) => substituted.push_str(replacement),
            Canonical::Keep => substituted.push(c),
        }
    }

    substituted.nfc().collect()
}
