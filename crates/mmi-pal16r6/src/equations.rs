//! Sum-of-products equation tables.

/// Data bit wired to PAL input I7. No product term in any recovered table
/// looks at it; the dumps were checked for this, it is not an omission.
pub const UNUSED_INPUT_MASK: u8 = 0x04;

/// One AND term: every bit in `ones` must be high and every bit in `zeros`
/// must be low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductTerm {
    pub ones: u8,
    pub zeros: u8,
}

impl ProductTerm {
    #[must_use]
    pub const fn matches(self, input: u8) -> bool {
        input & self.ones == self.ones && input & self.zeros == 0
    }
}

/// Equations of one programmed device.
///
/// `outputs[n]` is the OR mask of product terms driving data bit `n`
/// (bit k of the mask selects `terms[k]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquationTable {
    pub terms: [ProductTerm; 4],
    pub outputs: [u8; 8],
}

impl EquationTable {
    /// Logical (active-high) outputs for one clocked input byte.
    #[must_use]
    pub const fn evaluate(&self, input: u8) -> u8 {
        let mut active = 0u8;
        let mut k = 0;
        while k < self.terms.len() {
            if self.terms[k].matches(input) {
                active |= 1 << k;
            }
            k += 1;
        }

        let mut result = 0u8;
        let mut bit = 0;
        while bit < 8 {
            if self.outputs[bit] & active != 0 {
                result |= 1 << bit;
            }
            bit += 1;
        }
        result
    }

    /// Data bits read by at least one product term.
    #[must_use]
    pub const fn used_inputs(&self) -> u8 {
        let mut used = 0u8;
        let mut k = 0;
        while k < self.terms.len() {
            used |= self.terms[k].ones | self.terms[k].zeros;
            k += 1;
        }
        used
    }
}

const T1: u8 = 0b0001;
const T2: u8 = 0b0010;
const T3: u8 = 0b0100;
const T4: u8 = 0b1000;

/// Mr. Do! (Taito license) U001, equations extracted from the dump with
/// jedutil:
///
/// ```text
/// t1 =  i2 & /i3 &  i4 & /i5 & /i6 & /i8 &  i9
/// t2 = /i2 & /i3 &  i4 &  i5 & /i6 &  i8 & /i9
/// t3 =  i2 &  i3 & /i4 & /i5 &  i6 & /i8 &  i9
/// t4 = /i2 &  i3 &  i4 & /i5 &  i6 &  i8 &  i9
///
/// r13 = t1        r16 = t1
/// r14 = t1 | t2   r17 = t1 | t3
/// r15 = t1 | t3   r18 = t3 | t4
/// ```
pub const MRDO_U001: EquationTable = EquationTable {
    terms: [
        // t1: D7 /D6 D5 /D4 /D3 /D1 D0
        ProductTerm {
            ones: 0xA1,
            zeros: 0x5A,
        },
        // t2: /D7 /D6 D5 D4 /D3 D1 /D0
        ProductTerm {
            ones: 0x32,
            zeros: 0xC9,
        },
        // t3: D7 D6 /D5 /D4 D3 /D1 D0
        ProductTerm {
            ones: 0xC9,
            zeros: 0x32,
        },
        // t4: /D7 D6 D5 /D4 D3 D1 D0
        ProductTerm {
            ones: 0x6B,
            zeros: 0x90,
        },
    ],
    outputs: [
        0,       // r12
        T1,      // r13
        T1 | T2, // r14
        T1 | T3, // r15
        T1,      // r16
        T1 | T3, // r17
        T3 | T4, // r18
        0,       // r19
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn bit(data: u8, n: u8) -> u8 {
        (data >> n) & 1
    }

    /// The jedutil equations written out pin by pin.
    fn u001_reference(data: u8) -> u8 {
        let i9 = bit(data, 0);
        let i8 = bit(data, 1);
        let i6 = bit(data, 3);
        let i5 = bit(data, 4);
        let i4 = bit(data, 5);
        let i3 = bit(data, 6);
        let i2 = bit(data, 7);

        let t1 = i2 & (1 ^ i3) & i4 & (1 ^ i5) & (1 ^ i6) & (1 ^ i8) & i9;
        let t2 = (1 ^ i2) & (1 ^ i3) & i4 & i5 & (1 ^ i6) & i8 & (1 ^ i9);
        let t3 = i2 & i3 & (1 ^ i4) & (1 ^ i5) & i6 & (1 ^ i8) & i9;
        let t4 = (1 ^ i2) & i3 & i4 & (1 ^ i5) & i6 & i8 & i9;

        (t1 << 1)
            | ((t1 | t2) << 2)
            | ((t1 | t3) << 3)
            | (t1 << 4)
            | ((t1 | t3) << 5)
            | ((t3 | t4) << 6)
    }

    #[test]
    fn table_matches_equations_for_every_input() {
        for data in 0..=255u8 {
            assert_eq!(
                MRDO_U001.evaluate(data),
                u001_reference(data),
                "input {data:#04X}"
            );
        }
    }

    #[test]
    fn each_term_fires_on_one_value_pair() {
        let hits: Vec<u8> = (0..=255u8).filter(|&d| MRDO_U001.evaluate(d) != 0).collect();
        assert_eq!(hits, vec![0x32, 0x36, 0x6B, 0x6F, 0xA1, 0xA5, 0xC9, 0xCD]);
    }

    #[test]
    fn pin7_is_never_read() {
        assert_eq!(MRDO_U001.used_inputs(), !UNUSED_INPUT_MASK);
    }

    #[test]
    fn outer_bits_are_never_driven() {
        for data in 0..=255u8 {
            assert_eq!(MRDO_U001.evaluate(data) & 0x81, 0);
        }
    }

    #[test]
    fn term_match_needs_both_polarities() {
        let term = ProductTerm {
            ones: 0x01,
            zeros: 0x02,
        };
        assert!(term.matches(0x01));
        assert!(!term.matches(0x03));
        assert!(!term.matches(0x00));
    }
}
