//! Static mapping between the 3-octave playable range (MIDI 48..=83, C3..B5)
//! and the lyre's 36 key symbols.

pub const OCTAVE: i32 = 12;
/// C3, the lowest playable pitch.
pub const LOWEST_PITCH: i32 = 48;
/// B5, the highest playable pitch.
pub const HIGHEST_PITCH: i32 = 83;
/// C5, base of the top playable octave (fold-down target).
pub const HIGH_FOLD_BASE: i32 = 72;

/// Key symbol per playable slot; `None` marks a pitch class with no wired key.
/// Rows: bottom octave on the home row, middle on qwerty, top on the digits.
const KEYMAP: [Option<char>; 36] = [
    Some('a'), None, Some('s'), None, Some('d'), Some('f'),
    None, Some('g'), None, Some('h'), None, Some('j'),
    Some('q'), None, Some('w'), None, Some('e'), Some('r'),
    None, Some('t'), None, Some('y'), None, Some('u'),
    Some('1'), None, Some('2'), None, Some('3'), Some('4'),
    None, Some('5'), None, Some('6'), None, Some('7'),
];

/// Letter per pitch class; `None` classes are sharps of the previous letter.
const NOTE_LETTERS: [Option<char>; 12] = [
    Some('C'), None, Some('D'), None, Some('E'), Some('F'),
    None, Some('G'), None, Some('A'), None, Some('B'),
];

/// Whether this pitch class (0..12) has a key wired in every octave row.
pub fn is_playable_class(class: u8) -> bool {
    KEYMAP[class as usize % 12].is_some()
}

/// Key symbol for an absolute pitch; `None` if the pitch is outside the
/// playable range or its slot has no wired key.
pub fn symbol_for(pitch: u8) -> Option<char> {
    let slot = pitch as i32 - LOWEST_PITCH;
    if !(0..36).contains(&slot) {
        return None;
    }
    KEYMAP[slot as usize]
}

/// Human-readable note name, e.g. 60 -> "C4", 61 -> "C#4".
pub fn note_name(pitch: u8) -> String {
    let class = (pitch % 12) as usize;
    let octave = pitch as i32 / OCTAVE - 1;
    match NOTE_LETTERS[class] {
        Some(letter) => format!("{}{}", letter, octave),
        // class 0 is always lettered, so class - 1 stays in bounds
        None => format!("{}#{}", NOTE_LETTERS[class - 1].unwrap_or('?'), octave),
    }
}
