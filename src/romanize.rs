// ============================================
// src/romanize.rs
// Rough Thai -> Latin transliteration (approximate RTGS)
// Used only when a word list has no romanization column.
// ============================================

/// Characters dropped before mapping: phinthu, thanthakhat, nikkhahit, yamakkan.
const SILENT_MARKS: &[char] = &['\u{0E3A}', '\u{0E4C}', '\u{0E4D}', '\u{0E4E}'];

/// Vowels whose long runs get collapsed.
const COLLAPSIBLE: &[char] = &['a', 'o', 'u', 'i', 'e', 'y'];

fn map_char(ch: char) -> Option<&'static str> {
    let latin = match ch {
        // consonants
        'ก' => "k",
        'ข' | 'ฃ' | 'ค' | 'ฅ' | 'ฆ' => "kh",
        'ง' => "ng",
        'จ' | 'ฉ' | 'ช' | 'ฌ' => "ch",
        'ซ' | 'ศ' | 'ษ' | 'ส' => "s",
        'ญ' | 'ย' => "y",
        'ฎ' | 'ด' => "d",
        'ฏ' | 'ต' => "t",
        'ฐ' | 'ฑ' | 'ฒ' | 'ถ' | 'ท' | 'ธ' => "th",
        'น' => "n",
        'บ' => "b",
        'ป' => "p",
        'ผ' | 'พ' | 'ภ' => "ph",
        'ฝ' | 'ฟ' => "f",
        'ม' => "m",
        'ห' | 'ฮ' => "h",
        'ร' => "r",
        'ล' | 'ฬ' => "l",
        'ว' => "w",
        // vowel carrier
        'อ' => "o",
        'ฤ' => "rue",
        'ฦ' => "lue",
        // vowels and signs
        'ะ' | 'า' | 'ั' => "a",
        'ิ' | 'ี' => "i",
        'ึ' | 'ื' => "ue",
        'ุ' | 'ู' => "u",
        'เ' => "e",
        'แ' => "ae",
        'โ' => "o",
        'ใ' | 'ไ' => "ai",
        'ำ' => "am",
        _ => return None,
    };
    Some(latin)
}

/// Transliterates Thai script into a readable Latin hint.
///
/// Not phonemically accurate. Tone marks are kept out of the mapping table and
/// pass through unchanged, as does anything that is not Thai.
pub fn romanize_thai(input: &str) -> String {
    let mut mapped = String::with_capacity(input.len());
    for ch in input.chars().filter(|c| !SILENT_MARKS.contains(c)) {
        match map_char(ch) {
            Some(latin) => mapped.push_str(latin),
            None => mapped.push(ch),
        }
    }
    collapse_vowel_runs(&mapped)
}

/// "aaaa" -> "aa": runs of three or more of the same vowel keep two.
fn collapse_vowel_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev: Option<char> = None;
    let mut run = 0;
    for ch in text.chars() {
        if Some(ch) == prev {
            run += 1;
        } else {
            prev = Some(ch);
            run = 1;
        }
        if run > 2 && COLLAPSIBLE.contains(&ch) {
            continue;
        }
        out.push(ch);
    }
    out
}
