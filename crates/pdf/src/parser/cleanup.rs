use unicode_normalization::UnicodeNormalization;

const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Clean up the text of a single decoded run.
///
/// NFC-normalizes and expands typographic ligatures. Tabs and non-breaking
/// spaces become plain spaces; replacement characters and other control
/// characters are dropped. Whitespace runs are not collapsed: heading
/// recognition needs to see the gap between number and title.
pub fn clean_fragment_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.nfc() {
        if let Some((_, expansion)) = LIGATURES.iter().find(|(lig, _)| *lig == c) {
            out.push_str(expansion);
            continue;
        }
        match c {
            '\u{FFFD}' => {}
            '\t' => out.push(' '),
            c if c.is_control() => {}
            // Non-breaking space is common between a section number and its title.
            '\u{00A0}' => out.push(' '),
            c => out.push(c),
        }
    }
    out
}
