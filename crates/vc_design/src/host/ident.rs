use core::fmt;

use slotmap::Key;

slotmap::new_key_type! {
    /// Identity of an object living in a design host.
    ///
    /// Two values referring to the same object compare equal even when
    /// the object's state differs between observations.
    pub struct ObjectId;
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:?}", self.data())
    }
}
