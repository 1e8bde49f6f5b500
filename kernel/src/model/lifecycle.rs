use std::fmt::Display;

use shared::error::{AppError, AppResult};

// Each status enum lists its legal edges in `next`; statuses change only through `apply`.
pub trait Lifecycle: Copy + Display + Sized {
    type Action: Copy + Display;

    /// Status reached from `self` by `action`, if the table has that edge.
    fn next(self, action: Self::Action) -> Option<Self>;

    fn is_terminal(self) -> bool;

    fn apply(self, action: Self::Action) -> AppResult<Self> {
        self.next(action).ok_or_else(|| {
            if self.is_terminal() {
                AppError::InvalidTransition(format!("cannot {action}: {self} is final"))
            } else {
                AppError::InvalidTransition(format!("cannot {action} while {self}"))
            }
        })
    }
}
