/// Accepts a new switch reading once it has been seen on `polls` consecutive polls.
#[derive(Debug, Clone)]
pub struct SwitchDebouncer<T> {
    accepted: T,
    candidate: T,
    stable: u8,
    polls: u8,
}

impl<T: Copy + PartialEq> SwitchDebouncer<T> {
    pub fn new(initial: T, polls: u8) -> Self {
        Self {
            accepted: initial,
            candidate: initial,
            stable: 0,
            polls: polls.max(1),
        }
    }

    pub fn value(&self) -> T {
        self.accepted
    }

    pub fn update(&mut self, sample: T) -> Option<T> {
        if sample == self.accepted {
            self.candidate = sample;
            self.stable = 0;
            return None;
        }

        if sample == self.candidate {
            self.stable += 1;
        } else {
            self.candidate = sample;
            self.stable = 1;
        }

        if self.stable >= self.polls {
            self.accepted = sample;
            self.stable = 0;
            Some(sample)
        } else {
            None
        }
    }
}
