use serde::{Deserialize, Serialize};

/// Digital buttons reported by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Start,
    Back,
    LeftThumb,
    RightThumb,
    LeftShoulder,
    RightShoulder,
    A,
    B,
    X,
    Y,
}

impl Button {
    pub const COUNT: usize = 14;

    pub const ALL: [Button; Self::COUNT] = [
        Button::DPadUp,
        Button::DPadDown,
        Button::DPadLeft,
        Button::DPadRight,
        Button::Start,
        Button::Back,
        Button::LeftThumb,
        Button::RightThumb,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
    ];

    #[inline]
    pub const fn bit(self) -> u16 {
        1u16 << (self as u16)
    }
}

/// Fixed-size set of pressed buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ButtonSet(u16);

impl ButtonSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Create a set from a slice of buttons.
    pub fn new(buttons: &[Button]) -> Self {
        let mut set = Self::empty();
        for &b in buttons {
            set.insert(b);
        }
        set
    }

    #[inline]
    pub fn contains(&self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    /// Clear a button. Always `AND NOT`, never a toggle.
    #[inline]
    pub fn remove(&mut self, button: Button) {
        self.0 &= !button.bit();
    }

    #[inline]
    pub fn set(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.insert(button);
        } else {
            self.remove(button);
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate the pressed buttons in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Button> + '_ {
        Button::ALL.into_iter().filter(move |b| self.contains(*b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_are_distinct() {
        let mut all = 0u16;
        for b in Button::ALL {
            assert_eq!(all & b.bit(), 0, "{b:?} overlaps");
            all |= b.bit();
        }
        assert_eq!(all.count_ones() as usize, Button::COUNT);
    }

    #[test]
    fn remove_clears_only_that_bit() {
        let mut set = ButtonSet::new(&[Button::A, Button::B]);
        set.remove(Button::A);
        assert!(!set.contains(Button::A));
        assert!(set.contains(Button::B));

        // Removing an absent button must not set it.
        set.remove(Button::A);
        assert!(!set.contains(Button::A));
        assert_eq!(set.count(), 1);
    }

    #[test]
    fn set_toggles_by_flag() {
        let mut set = ButtonSet::empty();
        set.set(Button::Start, true);
        assert!(set.contains(Button::Start));
        set.set(Button::Start, false);
        assert!(set.is_empty());
    }

    #[test]
    fn iter_follows_declaration_order() {
        let set = ButtonSet::new(&[Button::Y, Button::DPadUp, Button::A]);
        let got: Vec<_> = set.iter().collect();
        assert_eq!(got, vec![Button::DPadUp, Button::A, Button::Y]);
    }
}
