// Which run is armed

/// 1-based index into a fixed, cyclic list of runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSelection {
    number: u8,
    count: u8,
}

impl RunSelection {
    /// First of `count` runs; `count` is at least one
    pub fn first(count: u8) -> Self {
        Self {
            number: 1,
            count: count.max(1),
        }
    }

    /// Run `number` of `count`, if it exists
    pub fn nth(number: u8, count: u8) -> Option<Self> {
        (1..=count)
            .contains(&number)
            .then_some(Self { number, count })
    }

    pub fn number(self) -> u8 {
        self.number
    }

    pub fn count(self) -> u8 {
        self.count
    }

    /// Zero-based position in the run table
    pub fn index(self) -> usize {
        (self.number - 1) as usize
    }

    pub fn next(self) -> Self {
        let number = if self.number == self.count { 1 } else { self.number + 1 };
        Self { number, ..self }
    }

    pub fn prev(self) -> Self {
        let number = if self.number == 1 { self.count } else { self.number - 1 };
        Self { number, ..self }
    }
}
