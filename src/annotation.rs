use crate::constant_pool::ConstantPool;
use crate::descriptor::field_descriptor_package;
use crate::error::{DecodeWarning, Result};
use crate::reader::Reader;

/// Nesting bound for `@` and `[` element values.
pub const MAX_ANNOTATION_DEPTH: usize = 64;

/// Packages referenced by one `RuntimeVisibleAnnotations` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReferences {
    /// In order of appearance, duplicates kept.
    pub packages: Vec<String>,
    /// Set when the walk had to stop early.
    pub warning: Option<DecodeWarning>,
}

enum Walk {
    Continue,
    Abandon(DecodeWarning),
}

/// Walks a `RuntimeVisibleAnnotations` attribute payload and collects the
/// packages of annotation types, enum constant types and class literals.
///
/// Truncated payloads and bad pool indices are fatal for the class. An
/// unknown element tag or excessive nesting only stops this attribute and is
/// reported through [`AnnotationReferences::warning`].
pub fn annotation_references(data: &[u8], pool: &ConstantPool) -> Result<AnnotationReferences> {
    let mut walker = Walker {
        reader: Reader::new(data),
        pool,
        packages: Vec::new(),
    };
    let count = walker.reader.read_u2()?;
    let warning = match walker.annotations(count, 0)? {
        Walk::Continue => None,
        Walk::Abandon(warning) => Some(warning),
    };
    Ok(AnnotationReferences {
        packages: walker.packages,
        warning,
    })
}

struct Walker<'a, 'p> {
    reader: Reader<'a>,
    pool: &'p ConstantPool,
    packages: Vec<String>,
}

impl Walker<'_, '_> {
    fn annotations(&mut self, count: u16, depth: usize) -> Result<Walk> {
        for _ in 0..count {
            let type_index = self.reader.read_u2()?;
            let pairs = self.reader.read_u2()?;
            self.note_descriptor(type_index)?;
            for _ in 0..pairs {
                let _element_name_index = self.reader.read_u2()?;
                if let Walk::Abandon(warning) = self.element_value(depth)? {
                    return Ok(Walk::Abandon(warning));
                }
            }
        }
        Ok(Walk::Continue)
    }

    fn element_value(&mut self, depth: usize) -> Result<Walk> {
        if depth >= MAX_ANNOTATION_DEPTH {
            return Ok(Walk::Abandon(DecodeWarning::AnnotationTooDeep {
                limit: MAX_ANNOTATION_DEPTH,
            }));
        }

        let offset = self.reader.position();
        let tag = self.reader.read_u1()?;
        match tag {
            b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => {
                self.reader.read_u2()?;
            }
            b'e' => {
                let type_name_index = self.reader.read_u2()?;
                let _const_name_index = self.reader.read_u2()?;
                self.note_descriptor(type_name_index)?;
            }
            b'c' => {
                let class_info_index = self.reader.read_u2()?;
                self.note_descriptor(class_info_index)?;
            }
            b'@' => return self.annotations(1, depth + 1),
            b'[' => {
                let values = self.reader.read_u2()?;
                for _ in 0..values {
                    if let Walk::Abandon(warning) = self.element_value(depth + 1)? {
                        return Ok(Walk::Abandon(warning));
                    }
                }
            }
            _ => {
                return Ok(Walk::Abandon(DecodeWarning::UnrecognizedAnnotationTag {
                    tag,
                    offset,
                }));
            }
        }
        Ok(Walk::Continue)
    }

    fn note_descriptor(&mut self, index: u16) -> Result<()> {
        let descriptor = self.pool.utf8(index)?;
        if let Some(package) = field_descriptor_package(descriptor)? {
            self.packages.push(package);
        }
        Ok(())
    }
}
