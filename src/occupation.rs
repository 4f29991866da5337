// 🔤 Occupation Filter - Drop OCR fragments posing as occupations
// A lone letter ("h", "r", "b") is almost always a stray residence indicator

use crate::record::ResidentRecord;

pub fn is_single_letter(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

/// Clear single-letter occupations in place, returns how many were cleared
pub fn filter_occupations(records: &mut [ResidentRecord]) -> usize {
    let mut cleared = 0;

    for record in records.iter_mut() {
        if record.occupation.as_deref().is_some_and(is_single_letter) {
            record.occupation = None;
            cleared += 1;
        }
    }

    cleared
}
