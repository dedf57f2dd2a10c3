use std::fmt;

/// `Location` of a field within a CallFlow configuration document.
/// Locations are built up on the stack while walking a tree, and are only
/// rendered (as a JSON pointer) when an error must name the offending field.
///
/// ```
/// use callflow::Location;
///
/// let l0 = Location::Root;
/// let l1 = l0.push_prop("root");
/// let l2 = l1.push_prop("branches");
/// let l3 = l2.push_item(2);
///
/// assert_eq!("/root/branches/2", l3.pointer_str().to_string());
/// assert_eq!("/a~1b~0c", l0.push_prop("a/b~c").pointer_str().to_string());
/// ```
#[derive(Copy, Clone)]
pub enum Location<'a> {
    Root,
    Property(LocatedProperty<'a>),
    Item(LocatedItem<'a>),
}

/// `LocatedProperty` is a property located within a document.
#[derive(Copy, Clone)]
pub struct LocatedProperty<'a> {
    pub parent: &'a Location<'a>,
    pub name: &'a str,
}

/// `LocatedItem` is an array item located within a document.
#[derive(Copy, Clone)]
pub struct LocatedItem<'a> {
    pub parent: &'a Location<'a>,
    pub index: usize,
}

impl<'a> Location<'a> {
    /// Returns a new Location that extends this one with the given property.
    pub fn push_prop(&'a self, name: &'a str) -> Location<'a> {
        Location::Property(LocatedProperty { parent: self, name })
    }

    /// Returns a new Location that extends this one with the given index.
    pub fn push_item(&'a self, index: usize) -> Location<'a> {
        Location::Item(LocatedItem {
            parent: self,
            index,
        })
    }

    /// Returns a struct implementing `Display` which renders this location as a JSON pointer.
    pub fn pointer_str(&'a self) -> PointerStr<'a> {
        PointerStr(*self)
    }
}

impl<'a> fmt::Debug for Location<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pointer_str())
    }
}

/// Helper struct to format a location as a JSON pointer, escaping '~' and '/'.
pub struct PointerStr<'a>(Location<'a>);

impl<'a> fmt::Display for PointerStr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Location::Root => Ok(()),
            Location::Property(LocatedProperty { parent, name }) => {
                write!(f, "{}/", parent.pointer_str())?;
                for c in name.chars() {
                    match c {
                        '~' => f.write_str("~0")?,
                        '/' => f.write_str("~1")?,
                        c => fmt::Write::write_char(f, c)?,
                    }
                }
                Ok(())
            }
            Location::Item(LocatedItem { parent, index }) => {
                write!(f, "{}/{index}", parent.pointer_str())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::Location;

    #[test]
    fn test_pointer_rendering() {
        let root = Location::Root;
        assert_eq!(root.pointer_str().to_string(), "");

        let flow = root.push_prop("root");
        let branches = flow.push_prop("branches");
        let first = branches.push_item(0);
        let target = first.push_prop("target");
        let metadata = target.push_prop("metadata");
        let retries = metadata.push_prop("retry_count");

        assert_eq!(
            retries.pointer_str().to_string(),
            "/root/branches/0/target/metadata/retry_count"
        );
        assert_eq!(format!("{retries:?}"), "/root/branches/0/target/metadata/retry_count");
    }
}
