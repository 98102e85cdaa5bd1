//! Event entity

/// A named emission with its ordered arguments.
///
/// Built once per `emit` call (or ahead of time by a host and handed to
/// [`Emitter::dispatch`](super::Emitter::dispatch)); listeners only ever see
/// a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Event<A> {
    name: String,
    args: Vec<A>,
}

impl<A> Event<A> {
    pub fn new(name: impl Into<String>, args: Vec<A>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[A] {
        &self.args
    }

}
