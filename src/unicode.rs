// Hangul syllables are never tabulated: they decompose and compose through
// the closed-form arithmetic of Unicode §3.12.
//
//   S = S_BASE + (L_index * V_COUNT + V_index) * T_COUNT + T_index
//
// with L in U+1100..=U+1112, V in U+1161..=U+1175 and T in U+11A8..=U+11C2
// (T_index 0, i.e. U+11A7, means "no trailing consonant").

pub const S_BASE: u32 = 0xAC00;
pub const L_BASE: u32 = 0x1100;
pub const V_BASE: u32 = 0x1161;
pub const T_BASE: u32 = 0x11A7;
pub const L_COUNT: u32 = 19;
pub const V_COUNT: u32 = 21;
pub const T_COUNT: u32 = 28;
/// V_COUNT * T_COUNT
pub const N_COUNT: u32 = 588;
/// L_COUNT * N_COUNT
pub const S_COUNT: u32 = 11172;

/// Components of a precomposed syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jamo {
    pub lead: char,
    pub vowel: char,
    pub trail: Option<char>,
}

impl Jamo {
    /// Append the jamo to `out`.
    #[inline]
    pub fn write_to(self, out: &mut String) {
        out.push(self.lead);
        out.push(self.vowel);
        if let Some(t) = self.trail {
            out.push(t);
        }
    }
}

#[inline(always)]
pub fn is_hangul_syllable(c: char) -> bool {
    (c as u32).wrapping_sub(S_BASE) < S_COUNT
}

#[inline(always)]
fn is_leading_jamo(c: char) -> bool {
    (c as u32).wrapping_sub(L_BASE) < L_COUNT
}

#[inline(always)]
fn is_vowel_jamo(c: char) -> bool {
    (c as u32).wrapping_sub(V_BASE) < V_COUNT
}

/// Trailing consonants that actually compose (U+11A8..=U+11C2).
#[inline(always)]
fn is_trailing_jamo(c: char) -> bool {
    let t = (c as u32).wrapping_sub(T_BASE);
    t > 0 && t < T_COUNT
}

/// Split a precomposed syllable into its jamo. `None` outside U+AC00..=U+D7A3.
#[inline]
pub fn decompose_syllable(c: char) -> Option<Jamo> {
    let s = (c as u32).wrapping_sub(S_BASE);
    if s >= S_COUNT {
        return None;
    }

    let t = s % T_COUNT;
    Some(Jamo {
        lead: char::from_u32(L_BASE + s / N_COUNT)?,
        vowel: char::from_u32(V_BASE + (s % N_COUNT) / T_COUNT)?,
        trail: match t {
            0 => None,
            t => Some(char::from_u32(T_BASE + t)?),
        },
    })
}

/// Compose `L + V` into an LV syllable, or `LV + T` into an LVT syllable.
#[inline]
pub fn compose_pair(first: char, second: char) -> Option<char> {
    if is_leading_jamo(first) && is_vowel_jamo(second) {
        let l = first as u32 - L_BASE;
        let v = second as u32 - V_BASE;
        return char::from_u32(S_BASE + (l * V_COUNT + v) * T_COUNT);
    }

    let s = (first as u32).wrapping_sub(S_BASE);
    if s < S_COUNT && s % T_COUNT == 0 && is_trailing_jamo(second) {
        return char::from_u32(first as u32 + (second as u32 - T_BASE));
    }

    None
}
