// src/flags.rs

bitflags::bitflags! {
    /// Coarse record of what an edit (or a batch of edits) changed.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct ChangeFlags: u8 {
        /// Some value in the tree is different.
        const VALUE_CHANGED = 1 << 0;
        /// The set of children changed at some level: fields were activated
        /// or removed, entries inserted, a tag or summand switched.
        const STRUCTURE_CHANGED = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_combine() {
        let mut flags = ChangeFlags::empty();
        assert!(flags.is_empty());
        assert_eq!(flags, ChangeFlags::default());
        flags |= ChangeFlags::VALUE_CHANGED;
        assert!(flags.contains(ChangeFlags::VALUE_CHANGED));
        assert!(!flags.contains(ChangeFlags::VALUE_CHANGED | ChangeFlags::STRUCTURE_CHANGED));
        assert!(flags.intersects(ChangeFlags::VALUE_CHANGED | ChangeFlags::STRUCTURE_CHANGED));
        assert_eq!((flags | ChangeFlags::STRUCTURE_CHANGED).bits(), 0b11);
        assert_eq!(flags | ChangeFlags::STRUCTURE_CHANGED, ChangeFlags::all());
    }
}
