#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;

pub fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "class_depend_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

pub fn write_file(path: &Path, content: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

pub fn write_jar(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    use std::io::Write;
    use zip::write::FileOptions;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}

/// One annotation element value.
#[derive(Debug, Clone)]
pub enum Element {
    Int(i32),
    Str(&'static str),
    Enum(&'static str, &'static str),
    Class(&'static str),
    Nested(Annotation),
    Array(Vec<Element>),
    /// An element tag the decoder does not know, followed by nothing.
    UnknownTag(u8),
}

#[derive(Debug, Clone)]
pub struct Annotation {
    pub type_descriptor: &'static str,
    pub values: Vec<(&'static str, Element)>,
}

impl Annotation {
    pub fn marker(type_descriptor: &'static str) -> Self {
        Self {
            type_descriptor,
            values: Vec::new(),
        }
    }

    pub fn with(mut self, name: &'static str, value: Element) -> Self {
        self.values.push((name, value));
        self
    }
}

struct Member {
    access_flags: u16,
    name: u16,
    descriptor: u16,
    attributes: Vec<(u16, Vec<u8>)>,
}

/// Assembles class files byte by byte.
pub struct ClassFileBuilder {
    pool: Vec<u8>,
    next_index: u16,
    utf8s: HashMap<String, u16>,
    classes: HashMap<String, u16>,
    major_version: u16,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    attributes: Vec<(u16, Vec<u8>)>,
}

impl ClassFileBuilder {
    /// `name` in internal form, e.g. `com/acme/Widget`. Extends
    /// `java/lang/Object` until told otherwise.
    pub fn new(name: &str) -> Self {
        let mut builder = Self {
            pool: Vec::new(),
            next_index: 1,
            utf8s: HashMap::new(),
            classes: HashMap::new(),
            major_version: 52,
            access_flags: ACC_PUBLIC,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        builder.this_class = builder.class(name);
        builder.super_class = builder.class("java/lang/Object");
        builder
    }

    pub fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8s.get(value) {
            return *index;
        }
        let index = self.push_entry(1, 1);
        self.pool.extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(value.as_bytes());
        self.utf8s.insert(value.to_string(), index);
        index
    }

    pub fn class(&mut self, name: &str) -> u16 {
        if let Some(index) = self.classes.get(name) {
            return *index;
        }
        let name_index = self.utf8(name);
        let index = self.push_entry(7, 1);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        self.classes.insert(name.to_string(), index);
        index
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        let index = self.push_entry(3, 1);
        self.pool.extend_from_slice(&value.to_be_bytes());
        index
    }

    pub fn long(&mut self, value: i64) -> u16 {
        let index = self.push_entry(5, 2);
        self.pool.extend_from_slice(&value.to_be_bytes());
        index
    }

    pub fn double(&mut self, value: f64) -> u16 {
        let index = self.push_entry(6, 2);
        self.pool.extend_from_slice(&value.to_bits().to_be_bytes());
        index
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let utf8 = self.utf8(value);
        let index = self.push_entry(8, 1);
        self.pool.extend_from_slice(&utf8.to_be_bytes());
        index
    }

    pub fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class = self.class(owner);
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let nat = self.push_entry(12, 1);
        self.pool.extend_from_slice(&name.to_be_bytes());
        self.pool.extend_from_slice(&descriptor.to_be_bytes());
        let index = self.push_entry(10, 1);
        self.pool.extend_from_slice(&class.to_be_bytes());
        self.pool.extend_from_slice(&nat.to_be_bytes());
        index
    }

    fn push_entry(&mut self, tag: u8, slots: u16) -> u16 {
        let index = self.next_index;
        self.pool.push(tag);
        self.next_index += slots;
        index
    }

    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    pub fn major_version(mut self, major: u16) -> Self {
        self.major_version = major;
        self
    }

    pub fn extends(mut self, name: &str) -> Self {
        self.super_class = self.class(name);
        self
    }

    pub fn no_super(mut self) -> Self {
        self.super_class = 0;
        self
    }

    pub fn this_class_index(mut self, index: u16) -> Self {
        self.this_class = index;
        self
    }

    pub fn implements(mut self, name: &str) -> Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    pub fn field(self, name: &str, descriptor: &str) -> Self {
        self.annotated_field(name, descriptor, &[])
    }

    pub fn annotated_field(mut self, name: &str, descriptor: &str, annotations: &[Annotation]) -> Self {
        let member = self.member(name, descriptor, annotations);
        self.fields.push(member);
        self
    }

    pub fn method(self, name: &str, descriptor: &str) -> Self {
        self.annotated_method(name, descriptor, &[])
    }

    pub fn annotated_method(mut self, name: &str, descriptor: &str, annotations: &[Annotation]) -> Self {
        let member = self.member(name, descriptor, annotations);
        self.methods.push(member);
        self
    }

    pub fn source_file(mut self, name: &str) -> Self {
        let index = self.utf8(name);
        self.attribute("SourceFile", index.to_be_bytes().to_vec())
    }

    pub fn class_annotations(mut self, annotations: &[Annotation]) -> Self {
        let payload = self.annotations_payload(annotations);
        self.attribute("RuntimeVisibleAnnotations", payload)
    }

    /// Raw class attribute.
    pub fn attribute(mut self, name: &str, info: Vec<u8>) -> Self {
        let name = self.utf8(name);
        self.attributes.push((name, info));
        self
    }

    fn member(&mut self, name: &str, descriptor: &str, annotations: &[Annotation]) -> Member {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let mut attributes = Vec::new();
        if !annotations.is_empty() {
            let attr_name = self.utf8("RuntimeVisibleAnnotations");
            attributes.push((attr_name, self.annotations_payload(annotations)));
        }
        Member {
            access_flags: ACC_PUBLIC,
            name,
            descriptor,
            attributes,
        }
    }

    pub fn annotations_payload(&mut self, annotations: &[Annotation]) -> Vec<u8> {
        let mut out = (annotations.len() as u16).to_be_bytes().to_vec();
        for annotation in annotations {
            self.encode_annotation(annotation, &mut out);
        }
        out
    }

    fn encode_annotation(&mut self, annotation: &Annotation, out: &mut Vec<u8>) {
        let type_index = self.utf8(annotation.type_descriptor);
        out.extend_from_slice(&type_index.to_be_bytes());
        out.extend_from_slice(&(annotation.values.len() as u16).to_be_bytes());
        for (name, value) in &annotation.values {
            let name_index = self.utf8(name);
            out.extend_from_slice(&name_index.to_be_bytes());
            self.encode_element(value, out);
        }
    }

    fn encode_element(&mut self, element: &Element, out: &mut Vec<u8>) {
        match element {
            Element::Int(value) => {
                let index = self.integer(*value);
                out.push(b'I');
                out.extend_from_slice(&index.to_be_bytes());
            }
            Element::Str(value) => {
                let index = self.utf8(value);
                out.push(b's');
                out.extend_from_slice(&index.to_be_bytes());
            }
            Element::Enum(type_descriptor, constant) => {
                let type_index = self.utf8(type_descriptor);
                let const_index = self.utf8(constant);
                out.push(b'e');
                out.extend_from_slice(&type_index.to_be_bytes());
                out.extend_from_slice(&const_index.to_be_bytes());
            }
            Element::Class(descriptor) => {
                let index = self.utf8(descriptor);
                out.push(b'c');
                out.extend_from_slice(&index.to_be_bytes());
            }
            Element::Nested(annotation) => {
                out.push(b'@');
                self.encode_annotation(annotation, out);
            }
            Element::Array(values) => {
                out.push(b'[');
                out.extend_from_slice(&(values.len() as u16).to_be_bytes());
                for value in values {
                    self.encode_element(value, out);
                }
            }
            Element::UnknownTag(tag) => out.push(*tag),
        }
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFEBABEu32.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&self.major_version.to_be_bytes());
        out.extend_from_slice(&self.next_index.to_be_bytes());
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());
        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for interface in &self.interfaces {
            out.extend_from_slice(&interface.to_be_bytes());
        }
        for members in [&self.fields, &self.methods] {
            out.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for member in members {
                out.extend_from_slice(&member.access_flags.to_be_bytes());
                out.extend_from_slice(&member.name.to_be_bytes());
                out.extend_from_slice(&member.descriptor.to_be_bytes());
                write_attributes(&member.attributes, &mut out);
            }
        }
        write_attributes(&self.attributes, &mut out);
        out
    }
}

fn write_attributes(attributes: &[(u16, Vec<u8>)], out: &mut Vec<u8>) {
    out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
    for (name, info) in attributes {
        out.extend_from_slice(&name.to_be_bytes());
        out.extend_from_slice(&(info.len() as u32).to_be_bytes());
        out.extend_from_slice(info);
    }
}

/// A concrete class in `package` (internal form, may be empty) that refers
/// to each of `dependencies` through a field.
pub fn class_depending_on(package: &str, simple_name: &str, dependencies: &[&str]) -> Vec<u8> {
    let name = if package.is_empty() {
        simple_name.to_string()
    } else {
        format!("{package}/{simple_name}")
    };
    let mut builder = ClassFileBuilder::new(&name);
    for (i, dependency) in dependencies.iter().enumerate() {
        builder = builder.field(&format!("f{i}"), &format!("L{dependency};"));
    }
    builder.build()
}
