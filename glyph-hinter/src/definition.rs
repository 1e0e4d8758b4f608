//! Management of function definitions.

use core::ops::Range;
use std::collections::BTreeMap;

use super::{error::HintErrorKind, program::Program};

/// Code range and properties for a function definition.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Definition {
    program: Program,
    code_range: Range<usize>,
    key: i32,
}

impl Definition {
    /// Creates a new definition with the given program, code range and
    /// function number.
    pub fn new(program: Program, code_range: Range<usize>, key: i32) -> Self {
        Self {
            program,
            code_range,
            key,
        }
    }

    /// Returns the program that contains this definition.
    pub fn program(&self) -> Program {
        self.program
    }

    /// Returns the byte range of the code for this definition in the source
    /// program.
    ///
    /// The range starts at the first instruction of the body and includes
    /// the terminating `ENDF`.
    pub fn code_range(&self) -> Range<usize> {
        self.code_range.clone()
    }

    /// Returns the function number.
    pub fn key(&self) -> i32 {
        self.key
    }
}

/// Function number to definition map built by the font program.
#[derive(Clone, Default, Debug)]
pub struct FunctionTable {
    definitions: BTreeMap<i32, Definition>,
}

impl FunctionTable {
    /// Records a definition, replacing any earlier one with the same
    /// number.
    pub fn define(&mut self, definition: Definition) {
        self.definitions.insert(definition.key, definition);
    }

    /// Returns the definition with the given function number.
    pub fn get(&self, key: i32) -> Result<&Definition, HintErrorKind> {
        self.definitions
            .get(&key)
            .ok_or(HintErrorKind::InvalidDefinition(key))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns an iterator over all definitions ordered by function number.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> + '_ {
        self.definitions.values()
    }

    pub fn clear(&mut self) {
        self.definitions.clear();
    }
}

/// Function table access for a running program.
///
/// The `Ref` vs `Mut` distinction exists because functions can only be
/// defined by the font program. Once built, the table is immutable and
/// this captures that in a type safe way.
pub enum FunctionMap<'a> {
    Ref(&'a FunctionTable),
    Mut(&'a mut FunctionTable),
}

impl FunctionMap<'_> {
    /// Records a new definition.
    pub fn define(&mut self, definition: Definition) -> Result<(), HintErrorKind> {
        match self {
            Self::Mut(table) => {
                table.define(definition);
                Ok(())
            }
            Self::Ref(_) => Err(HintErrorKind::DefinitionOutsideFontProgram),
        }
    }

    /// Returns the definition with the given function number.
    pub fn get(&self, key: i32) -> Result<&Definition, HintErrorKind> {
        self.table().get(key)
    }

    /// Returns the underlying table.
    pub fn table(&self) -> &FunctionTable {
        match self {
            Self::Ref(table) => table,
            Self::Mut(table) => table,
        }
    }

    /// If the map is mutable, removes all definitions.
    pub fn reset(&mut self) {
        if let Self::Mut(table) = self {
            table.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_redefine() {
        let mut table = FunctionTable::default();
        let mut map = FunctionMap::Mut(&mut table);
        map.define(Definition::new(Program::Font, 2..10, 7)).unwrap();
        map.define(Definition::new(Program::Font, 12..20, 7)).unwrap();
        map.define(Definition::new(Program::Font, 21..22, -3)).unwrap();
        assert_eq!(map.get(7).unwrap().code_range(), 12..20);
        assert_eq!(table.len(), 2);
        let keys = table.iter().map(|def| def.key()).collect::<Vec<_>>();
        assert_eq!(keys, [-3, 7]);
    }

    #[test]
    fn missing_definition() {
        let table = FunctionTable::default();
        let map = FunctionMap::Ref(&table);
        assert!(matches!(
            map.get(33),
            Err(HintErrorKind::InvalidDefinition(33))
        ));
    }

    #[test]
    fn immutable_after_font_program() {
        let mut table = FunctionTable::default();
        table.define(Definition::new(Program::Font, 0..1, 0));
        let mut map = FunctionMap::Ref(&table);
        assert!(matches!(
            map.define(Definition::new(Program::Font, 0..1, 1)),
            Err(HintErrorKind::DefinitionOutsideFontProgram)
        ));
        map.reset();
        assert_eq!(table.len(), 1);
    }
}
