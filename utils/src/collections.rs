mod queue;
mod stack;

pub use self::{queue::*, stack::*};
