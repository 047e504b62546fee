//! Text rendering of machines, one line per state and transition.
//!
//! ```text
//! init-state = 0
//! (0)
//!     == 'a' ==> 1
//! (1) A
//!     [p0 A]
//! ```

use super::{Origin, State, StateMachine};
use std::fmt::{self, Write};

impl fmt::Display for StateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "init-state = {}", self.init_state_id())?;
        for state in self.states() {
            write!(f, "{state}")?;
        }
        if let Some(pre) = self.pre_context() {
            writeln!(f, "pre-context {}:", pre.id())?;
            write!(f, "{pre}")?;
        }
        if let Some(detector) = self.backward_detector() {
            writeln!(f, "backward-detector {}:", detector.id())?;
            write!(f, "{detector}")?;
        }
        Ok(())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.id())?;
        let core = self.core();
        if core.acceptance {
            f.write_str(" A")?;
        }
        if core.store_input_position {
            f.write_str(" S")?;
        }
        if core.begin_of_line {
            f.write_str(" BOL")?;
        }
        if let Some(id) = core.pre_context_id {
            write!(f, " pre={id}")?;
        }
        if let Some(id) = core.post_context_id {
            write!(f, " post={id}")?;
        }
        if let Some(id) = core.backward_detector_id {
            write!(f, " bwd={id}")?;
        }
        f.write_char('\n')?;

        for (target, set) in self.transitions().iter() {
            writeln!(f, "    == {set} ==> {target}")?;
        }
        for target in self.transitions().epsilon_targets() {
            writeln!(f, "    == eps ==> {target}")?;
        }
        if !self.origins().is_empty() {
            f.write_str("    ")?;
            for (i, origin) in self.origins().iter().enumerate() {
                if i > 0 {
                    f.write_char(' ')?;
                }
                write!(f, "{origin}")?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.pattern_id)?;
        if self.is_acceptance {
            f.write_str(" A")?;
        }
        if self.store_input_position {
            f.write_str(" S")?;
        }
        if self.begin_of_line {
            f.write_str(" BOL")?;
        }
        if let Some(id) = self.pre_context_id {
            write!(f, " pre={id}")?;
        }
        if let Some(id) = self.post_context_id {
            write!(f, " post={id}")?;
        }
        if let Some(id) = self.backward_detector_id {
            write!(f, " bwd={id}")?;
        }
        f.write_char(']')
    }
}
