//! Synchronous password generation.
//!
//! A plain function call: pick a character set, get a password back. Nothing
//! here blocks on UI or event-loop semantics.

use anyhow::{anyhow, bail, Result};
use zeroize::Zeroizing;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*_-+=:;,./?";

/// Which character classes a generated password draws from.
#[derive(Debug, Clone, Copy)]
pub struct CharacterSet {
    pub lower: bool,
    pub upper: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for CharacterSet {
    fn default() -> Self {
        Self {
            lower: true,
            upper: true,
            digits: true,
            symbols: false,
        }
    }
}

impl CharacterSet {
    fn classes(&self) -> Vec<&'static [u8]> {
        let mut classes = Vec::new();
        if self.lower {
            classes.push(LOWER);
        }
        if self.upper {
            classes.push(UPPER);
        }
        if self.digits {
            classes.push(DIGITS);
        }
        if self.symbols {
            classes.push(SYMBOLS);
        }
        classes
    }
}

/// Generate a random password of `len` characters.
///
/// Every enabled character class contributes at least one character (so a
/// 12-character password with digits enabled really contains a digit), and
/// sampling is unbiased rejection sampling over OS randomness.
pub fn generate(len: usize, charset: CharacterSet) -> Result<Zeroizing<String>> {
    let classes = charset.classes();
    if classes.is_empty() {
        bail!("no character classes enabled");
    }
    if len < classes.len() {
        bail!(
            "length {len} cannot cover {} enabled character classes",
            classes.len()
        );
    }

    let alphabet: Vec<u8> = classes.concat();
    let mut password: Zeroizing<Vec<u8>> = Zeroizing::new(Vec::with_capacity(len));

    // One guaranteed pick per class, the rest from the full alphabet.
    for class in &classes {
        password.push(pick(class)?);
    }
    while password.len() < len {
        password.push(pick(&alphabet)?);
    }
    shuffle(&mut password)?;

    // The alphabet is pure ASCII, so this cannot fail.
    let text = String::from_utf8(password.to_vec())
        .map_err(|_| anyhow!("generated password was not UTF-8"))?;
    Ok(Zeroizing::new(text))
}

/// Pick one byte uniformly from `choices` by rejection sampling.
fn pick(choices: &[u8]) -> Result<u8> {
    debug_assert!(!choices.is_empty() && choices.len() <= 128);
    let zone = (256 / choices.len()) * choices.len();

    loop {
        let mut byte = [0u8; 1];
        secure_random(&mut byte)?;
        if usize::from(byte[0]) < zone {
            return Ok(choices[usize::from(byte[0]) % choices.len()]);
        }
    }
}

/// Fisher-Yates with rejection-sampled indices, so the guaranteed class
/// picks don't sit at predictable positions.
fn shuffle(bytes: &mut [u8]) -> Result<()> {
    for i in (1..bytes.len()).rev() {
        let j = pick_index(i + 1)?;
        bytes.swap(i, j);
    }
    Ok(())
}

fn pick_index(bound: usize) -> Result<usize> {
    debug_assert!(bound > 0 && bound <= 65536);
    let zone = (65536 / bound) * bound;

    loop {
        let mut bytes = [0u8; 2];
        secure_random(&mut bytes)?;
        let value = usize::from(u16::from_le_bytes(bytes));
        if value < zone {
            return Ok(value % bound);
        }
    }
}

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    getrandom::fill(buf).map_err(|_| anyhow!("OS random generator unavailable"))
}
