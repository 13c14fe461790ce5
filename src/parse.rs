//! Class-file decoding.
//!
//! [`ClassFileParser`] turns the bytes of one compiled type into a
//! [`ParsedClass`]: its name, super type, interfaces, abstractness, source
//! file and the set of packages it references. References are gathered from
//! the super class and interfaces, field and method descriptors, every
//! `Class` constant in the pool and `RuntimeVisibleAnnotations` attributes.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::annotation::annotation_references;
use crate::constant_pool::{ConstantPool, ConstantPoolEntry};
use crate::descriptor::{DEFAULT_PACKAGE, descriptor_types, package_of};
use crate::error::{DecodeError, DecodeWarning, Result};
use crate::filter::PackageFilter;
use crate::reader::Reader;

pub const JAVA_MAGIC: u32 = 0xCAFEBABE;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const UNKNOWN_SOURCE_FILE: &str = "Unknown";

const RUNTIME_VISIBLE_ANNOTATIONS: &str = "RuntimeVisibleAnnotations";
const SOURCE_FILE: &str = "SourceFile";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedClass {
    pub class_name: String,
    pub package_name: String,
    pub super_class_name: Option<String>,
    pub interface_names: Vec<String>,
    pub is_abstract: bool,
    pub source_file: String,
    /// Accepted by the filter, never the class's own package.
    pub imported_packages: BTreeSet<String>,
    pub minor_version: u16,
    pub major_version: u16,
    pub warnings: Vec<DecodeWarning>,
}

/// Notified once for every class that decodes successfully.
pub trait ParseListener: Send + Sync {
    fn on_parsed_class(&self, class: &ParsedClass);
}

impl<F> ParseListener for F
where
    F: Fn(&ParsedClass) + Send + Sync,
{
    fn on_parsed_class(&self, class: &ParsedClass) {
        self(class)
    }
}

/// Which `RuntimeVisibleAnnotations` attributes contribute imports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnnotationScan {
    /// Class, every field and every method.
    #[default]
    All,
    /// Ignores the first class attribute, the first field and the first
    /// method, reproducing reports produced by older analyzers.
    SkipFirst,
}

#[derive(Clone, Default)]
pub struct ClassFileParser {
    filter: PackageFilter,
    annotation_scan: AnnotationScan,
    listeners: Vec<Arc<dyn ParseListener>>,
}

impl fmt::Debug for ClassFileParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassFileParser")
            .field("filter", &self.filter)
            .field("annotation_scan", &self.annotation_scan)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ClassFileParser {
    pub fn new(filter: PackageFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn with_annotation_scan(mut self, scan: AnnotationScan) -> Self {
        self.annotation_scan = scan;
        self
    }

    pub fn filter(&self) -> &PackageFilter {
        &self.filter
    }

    pub fn add_parse_listener(&mut self, listener: Arc<dyn ParseListener>) {
        self.listeners.push(listener);
    }

    pub fn parse(&self, bytes: &[u8]) -> Result<ParsedClass> {
        self.parse_named("<memory>", bytes)
    }

    /// Decodes one class file; `origin` names it in errors and logs.
    pub fn parse_named(&self, origin: &str, bytes: &[u8]) -> Result<ParsedClass> {
        debug!(origin, "parsing class file");
        let class = Decoder::new(origin, bytes, &self.filter)?.decode(self.annotation_scan)?;
        for listener in &self.listeners {
            listener.on_parsed_class(&class);
        }
        Ok(class)
    }
}

struct MemberInfo<'a> {
    runtime_visible_annotations: Option<&'a [u8]>,
}

struct AttributeInfo<'a> {
    name: String,
    info: &'a [u8],
}

struct Decoder<'a, 'f> {
    origin: &'a str,
    reader: Reader<'a>,
    minor_version: u16,
    major_version: u16,
    pool: ConstantPool,
    filter: &'f PackageFilter,
    imports: BTreeSet<String>,
    warnings: Vec<DecodeWarning>,
}

impl<'a, 'f> Decoder<'a, 'f> {
    fn new(origin: &'a str, bytes: &'a [u8], filter: &'f PackageFilter) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4().map_err(|_| invalid_format(origin))?;
        if magic != JAVA_MAGIC {
            return Err(invalid_format(origin));
        }

        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let pool = ConstantPool::parse(&mut reader)?;

        Ok(Self {
            origin,
            reader,
            minor_version,
            major_version,
            pool,
            filter,
            imports: BTreeSet::new(),
            warnings: Vec::new(),
        })
    }

    fn decode(mut self, annotation_scan: AnnotationScan) -> Result<ParsedClass> {
        let access_flags = self.reader.read_u2()?;
        let is_abstract = access_flags & (ACC_ABSTRACT | ACC_INTERFACE) != 0;

        let class_name = self.pool.class_name(self.reader.read_u2()?)?;
        let package_name = package_of(&class_name)?.unwrap_or_else(|| DEFAULT_PACKAGE.to_string());
        debug!(class = %class_name, package = %package_name, is_abstract, "class header");

        let super_index = self.reader.read_u2()?;
        let super_class_name = if super_index == 0 {
            None
        } else {
            let name = self.pool.class_name(super_index)?;
            self.add_import_of(&name)?;
            Some(name)
        };

        let interfaces_count = self.reader.read_u2()?;
        let mut interface_names = Vec::with_capacity(usize::from(interfaces_count));
        for _ in 0..interfaces_count {
            let name = self.pool.class_name(self.reader.read_u2()?)?;
            self.add_import_of(&name)?;
            interface_names.push(name);
        }

        let fields = self.members("field")?;
        let methods = self.members("method")?;

        let attributes = self.attributes()?;
        let mut source_file = UNKNOWN_SOURCE_FILE.to_string();
        for attribute in &attributes {
            if attribute.name == SOURCE_FILE {
                let index = Reader::new(attribute.info).read_u2()?;
                source_file = self.pool.utf8(index)?.to_string();
            }
        }

        self.add_class_constant_references()?;

        let skip = match annotation_scan {
            AnnotationScan::All => 0,
            AnnotationScan::SkipFirst => 1,
        };
        let class_annotations = attributes
            .iter()
            .skip(skip)
            .filter(|a| a.name == RUNTIME_VISIBLE_ANNOTATIONS)
            .map(|a| a.info);
        let member_annotations = fields
            .iter()
            .skip(skip)
            .chain(methods.iter().skip(skip))
            .filter_map(|m| m.runtime_visible_annotations);
        let payloads: Vec<&[u8]> = class_annotations.chain(member_annotations).collect();
        for payload in payloads {
            self.add_annotation_references(payload)?;
        }

        self.imports.remove(&package_name);

        Ok(ParsedClass {
            class_name,
            package_name,
            super_class_name,
            interface_names,
            is_abstract,
            source_file,
            imported_packages: self.imports,
            minor_version: self.minor_version,
            major_version: self.major_version,
            warnings: self.warnings,
        })
    }

    fn members(&mut self, kind: &'static str) -> Result<Vec<MemberInfo<'a>>> {
        let count = self.reader.read_u2()?;
        let mut members = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let access_flags = self.reader.read_u2()?;
            let name_index = self.reader.read_u2()?;
            let descriptor_index = self.reader.read_u2()?;

            let name = self.pool.utf8(name_index)?;
            let descriptor = self.pool.utf8(descriptor_index)?.to_string();
            debug!(kind, name, descriptor = %descriptor, access_flags, "member");
            for ty in descriptor_types(&descriptor)? {
                if !ty.is_empty() {
                    self.add_import_of(ty)?;
                }
            }

            let mut runtime_visible_annotations = None;
            for attribute in self.attributes()? {
                if attribute.name == RUNTIME_VISIBLE_ANNOTATIONS {
                    runtime_visible_annotations = Some(attribute.info);
                }
            }
            members.push(MemberInfo {
                runtime_visible_annotations,
            });
        }
        Ok(members)
    }

    fn attributes(&mut self) -> Result<Vec<AttributeInfo<'a>>> {
        let count = self.reader.read_u2()?;
        let mut attributes = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let name_index = self.reader.read_u2()?;
            let name = self.pool.utf8(name_index)?.to_string();
            let length = self.reader.read_u4()? as usize;
            let info = self.reader.read_bytes(length)?;
            attributes.push(AttributeInfo { name, info });
        }
        Ok(attributes)
    }

    fn add_class_constant_references(&mut self) -> Result<()> {
        let names: Vec<u16> = self
            .pool
            .iter()
            .filter_map(|(_, entry)| match entry {
                ConstantPoolEntry::Class { name_index } => Some(*name_index),
                _ => None,
            })
            .collect();
        for name_index in names {
            let name = self.pool.utf8(name_index)?.to_string();
            self.add_import_of(&name)?;
        }
        Ok(())
    }

    fn add_annotation_references(&mut self, payload: &[u8]) -> Result<()> {
        let refs = annotation_references(payload, &self.pool)?;
        for package in refs.packages {
            self.add_import(package);
        }
        if let Some(warning) = refs.warning {
            warn!(origin = self.origin, %warning, "annotation skipped");
            self.warnings.push(warning);
        }
        Ok(())
    }

    fn add_import_of(&mut self, name: &str) -> Result<()> {
        if let Some(package) = package_of(name)? {
            self.add_import(package);
        }
        Ok(())
    }

    fn add_import(&mut self, package: String) {
        if self.filter.accept(&package) {
            self.imports.insert(package);
        }
    }
}

fn invalid_format(origin: &str) -> DecodeError {
    DecodeError::InvalidFormat {
        origin: origin.to_string(),
    }
}
