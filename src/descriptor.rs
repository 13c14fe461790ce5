use crate::constant_pool::slashes_to_dots;
use crate::error::{DecodeError, Result};

/// Package name used for classes declared without a package.
pub const DEFAULT_PACKAGE: &str = "Default";

/// Extracts every `L...;` object type referenced by a field or method
/// descriptor, in order of appearance. Primitive and void components are
/// skipped; array dimensions are transparent.
pub fn descriptor_types(descriptor: &str) -> Result<Vec<&str>> {
    let mut types = Vec::new();
    let mut rest = descriptor;
    while let Some(start) = rest.find('L') {
        let after = &rest[start + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| DecodeError::MalformedDescriptor(descriptor.to_string()))?;
        types.push(&after[..end]);
        rest = &after[end + 1..];
    }
    Ok(types)
}

/// Resolves the package a raw class or array name belongs to.
///
/// Array names (`[Lpkg/Type;`, `[[I`) are unwrapped to their element type;
/// arrays of primitives belong to no package. Names without a dot live in
/// [`DEFAULT_PACKAGE`].
pub fn package_of(name: &str) -> Result<Option<String>> {
    let name = if name.starts_with('[') {
        match descriptor_types(name)?.first() {
            Some(element) => *element,
            None => return Ok(None),
        }
    } else {
        name
    };

    let dotted = slashes_to_dots(name);
    match dotted.rfind('.') {
        Some(index) if index > 0 => Ok(Some(dotted[..index].to_string())),
        _ => Ok(Some(DEFAULT_PACKAGE.to_string())),
    }
}

/// Resolves the package of a single field descriptor as used by annotation
/// types, enum constants and class literals. `V` and primitive descriptors
/// resolve to `None`.
pub fn field_descriptor_package(descriptor: &str) -> Result<Option<String>> {
    let element = descriptor.trim_start_matches('[');
    match element.as_bytes().first() {
        Some(b'L') => {
            let internal = element[1..]
                .strip_suffix(';')
                .ok_or_else(|| DecodeError::MalformedDescriptor(descriptor.to_string()))?;
            package_of(internal)
        }
        Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'V') => Ok(None),
        _ => Err(DecodeError::MalformedDescriptor(descriptor.to_string())),
    }
}
