use crate::error::{DecodeError, Result};
use crate::reader::{Reader, decode_modified_utf8};

pub const CONSTANT_UTF8: u8 = 1;
pub const CONSTANT_INTEGER: u8 = 3;
pub const CONSTANT_FLOAT: u8 = 4;
pub const CONSTANT_LONG: u8 = 5;
pub const CONSTANT_DOUBLE: u8 = 6;
pub const CONSTANT_CLASS: u8 = 7;
pub const CONSTANT_STRING: u8 = 8;
pub const CONSTANT_FIELD_REF: u8 = 9;
pub const CONSTANT_METHOD_REF: u8 = 10;
pub const CONSTANT_INTERFACE_METHOD_REF: u8 = 11;
pub const CONSTANT_NAME_AND_TYPE: u8 = 12;
pub const CONSTANT_METHOD_HANDLE: u8 = 15;
pub const CONSTANT_METHOD_TYPE: u8 = 16;
pub const CONSTANT_INVOKE_DYNAMIC: u8 = 18;

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantPoolEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
    },
    String {
        index: u16,
    },
    MethodType {
        index: u16,
    },
    FieldRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    MethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    InterfaceMethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    InvokeDynamic {
        bootstrap_index: u16,
        name_and_type_index: u16,
    },
    MethodHandle {
        kind: u8,
        ref_index: u16,
    },
}

impl ConstantPoolEntry {
    pub fn tag(&self) -> u8 {
        match self {
            ConstantPoolEntry::Utf8(_) => CONSTANT_UTF8,
            ConstantPoolEntry::Integer(_) => CONSTANT_INTEGER,
            ConstantPoolEntry::Float(_) => CONSTANT_FLOAT,
            ConstantPoolEntry::Long(_) => CONSTANT_LONG,
            ConstantPoolEntry::Double(_) => CONSTANT_DOUBLE,
            ConstantPoolEntry::Class { .. } => CONSTANT_CLASS,
            ConstantPoolEntry::String { .. } => CONSTANT_STRING,
            ConstantPoolEntry::MethodType { .. } => CONSTANT_METHOD_TYPE,
            ConstantPoolEntry::FieldRef { .. } => CONSTANT_FIELD_REF,
            ConstantPoolEntry::MethodRef { .. } => CONSTANT_METHOD_REF,
            ConstantPoolEntry::InterfaceMethodRef { .. } => CONSTANT_INTERFACE_METHOD_REF,
            ConstantPoolEntry::NameAndType { .. } => CONSTANT_NAME_AND_TYPE,
            ConstantPoolEntry::InvokeDynamic { .. } => CONSTANT_INVOKE_DYNAMIC,
            ConstantPoolEntry::MethodHandle { .. } => CONSTANT_METHOD_HANDLE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ConstantPoolEntry::Utf8(_) => "Utf8",
            ConstantPoolEntry::Integer(_) => "Integer",
            ConstantPoolEntry::Float(_) => "Float",
            ConstantPoolEntry::Long(_) => "Long",
            ConstantPoolEntry::Double(_) => "Double",
            ConstantPoolEntry::Class { .. } => "Class",
            ConstantPoolEntry::String { .. } => "String",
            ConstantPoolEntry::MethodType { .. } => "MethodType",
            ConstantPoolEntry::FieldRef { .. } => "FieldRef",
            ConstantPoolEntry::MethodRef { .. } => "MethodRef",
            ConstantPoolEntry::InterfaceMethodRef { .. } => "InterfaceMethodRef",
            ConstantPoolEntry::NameAndType { .. } => "NameAndType",
            ConstantPoolEntry::InvokeDynamic { .. } => "InvokeDynamic",
            ConstantPoolEntry::MethodHandle { .. } => "MethodHandle",
        }
    }

    /// Number of pool slots the entry occupies.
    pub fn slots(&self) -> u16 {
        match self {
            ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_) => 2,
            _ => 1,
        }
    }
}

/// The 1-indexed constant pool. Slot 0 and the slot following every
/// `Long`/`Double` hold `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantPool {
    entries: Vec<Option<ConstantPoolEntry>>,
}

impl ConstantPool {
    pub fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()?;
        let mut entries: Vec<Option<ConstantPoolEntry>> = vec![None; usize::from(count)];

        let mut index: u16 = 1;
        while index < count {
            let entry = parse_entry(reader, index)?;
            let slots = entry.slots();
            entries[usize::from(index)] = Some(entry);
            index = index.saturating_add(slots);
        }

        Ok(Self { entries })
    }

    /// Pool size as declared in the class file (including slot 0).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a slot. Indices outside `[0, len)` are an error; reserved
    /// slots resolve to `None`.
    pub fn get(&self, index: u16) -> Result<Option<&ConstantPoolEntry>> {
        self.entries
            .get(usize::from(index))
            .map(Option::as_ref)
            .ok_or(DecodeError::IllegalPoolIndex {
                index,
                size: self.entries.len(),
            })
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Some(ConstantPoolEntry::Utf8(value)) => Ok(value),
            other => Err(mismatch(index, "Utf8", other)),
        }
    }

    /// Resolves a `Class` entry to its internal (slash separated) name.
    pub fn class_internal_name(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            Some(ConstantPoolEntry::Class { name_index }) => self.utf8(*name_index),
            other => Err(mismatch(index, "Class", other)),
        }
    }

    /// Resolves a `Class` entry to a dotted class name.
    pub fn class_name(&self, index: u16) -> Result<String> {
        Ok(slashes_to_dots(self.class_internal_name(index)?))
    }

    /// Iterates the occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantPoolEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|e| (i as u16, e)))
    }
}

fn mismatch(index: u16, expected: &'static str, found: Option<&ConstantPoolEntry>) -> DecodeError {
    DecodeError::UnexpectedConstant {
        index,
        expected,
        found: found.map_or("an unusable slot", ConstantPoolEntry::kind),
    }
}

fn parse_entry(reader: &mut Reader<'_>, index: u16) -> Result<ConstantPoolEntry> {
    let tag = reader.read_u1()?;
    let entry = match tag {
        CONSTANT_UTF8 => {
            let len = usize::from(reader.read_u2()?);
            let raw = reader.read_bytes(len)?;
            let value = decode_modified_utf8(raw).ok_or(DecodeError::InvalidUtf8 { index })?;
            ConstantPoolEntry::Utf8(value)
        }
        CONSTANT_INTEGER => ConstantPoolEntry::Integer(reader.read_i4()?),
        CONSTANT_FLOAT => ConstantPoolEntry::Float(reader.read_f4()?),
        CONSTANT_LONG => ConstantPoolEntry::Long(reader.read_i8()?),
        CONSTANT_DOUBLE => ConstantPoolEntry::Double(reader.read_f8()?),
        CONSTANT_CLASS => ConstantPoolEntry::Class {
            name_index: reader.read_u2()?,
        },
        CONSTANT_STRING => ConstantPoolEntry::String {
            index: reader.read_u2()?,
        },
        CONSTANT_METHOD_TYPE => ConstantPoolEntry::MethodType {
            index: reader.read_u2()?,
        },
        CONSTANT_FIELD_REF => ConstantPoolEntry::FieldRef {
            class_index: reader.read_u2()?,
            name_and_type_index: reader.read_u2()?,
        },
        CONSTANT_METHOD_REF => ConstantPoolEntry::MethodRef {
            class_index: reader.read_u2()?,
            name_and_type_index: reader.read_u2()?,
        },
        CONSTANT_INTERFACE_METHOD_REF => ConstantPoolEntry::InterfaceMethodRef {
            class_index: reader.read_u2()?,
            name_and_type_index: reader.read_u2()?,
        },
        CONSTANT_NAME_AND_TYPE => ConstantPoolEntry::NameAndType {
            name_index: reader.read_u2()?,
            descriptor_index: reader.read_u2()?,
        },
        CONSTANT_INVOKE_DYNAMIC => ConstantPoolEntry::InvokeDynamic {
            bootstrap_index: reader.read_u2()?,
            name_and_type_index: reader.read_u2()?,
        },
        CONSTANT_METHOD_HANDLE => ConstantPoolEntry::MethodHandle {
            kind: reader.read_u1()?,
            ref_index: reader.read_u2()?,
        },
        _ => return Err(DecodeError::UnknownConstant { tag, index }),
    };
    Ok(entry)
}

pub fn slashes_to_dots(name: &str) -> String {
    name.replace('/', ".")
}
