//! Typed variable descriptors shared by node attributes, uniforms, inputs,
//! and outputs. A slot is parsed once from a `type` / `type[count]` string
//! when its node is constructed and never changes afterwards; attribute
//! binding locations live in `compiler`, not here.

/// A typed variable declaration attached to a shader node.
#[derive(Debug, Clone, Eq)]
pub struct Slot {
    name: String,
    ty: String,
    arity: u32,
}

impl Slot {
    /// Parses a declaration from a raw type string, splitting a trailing
    /// `[N]` suffix into the arity. Strings without a well-formed suffix are
    /// kept whole as plain scalar or struct types.
    pub fn parse(name: impl Into<String>, ty: &str) -> Self {
        let (ty, arity) = split_array_suffix(ty);
        Self {
            name: name.into(),
            ty: ty.to_string(),
            arity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn arity(&self) -> u32 {
        self.arity
    }

    /// Renders `<type> <name>` or `<type> <name>[<arity>]`.
    pub fn declaration(&self) -> String {
        if self.arity == 1 {
            format!("{} {}", self.ty, self.name)
        } else {
            format!("{} {}[{}]", self.ty, self.name, self.arity)
        }
    }
}

// Deduplication across nodes compares name and base type only; arity is a
// rendering concern.
impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty
    }
}

fn split_array_suffix(raw: &str) -> (&str, u32) {
    let raw = raw.trim();
    if let Some(body) = raw.strip_suffix(']') {
        if let Some((base, count)) = body.rsplit_once('[') {
            if let Ok(count) = count.trim().parse::<u32>() {
                if !base.is_empty() {
                    return (base, count);
                }
            }
        }
    }
    (raw, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_type() {
        let slot = Slot::parse("pPosition", "vec3");
        assert_eq!(slot.ty(), "vec3");
        assert_eq!(slot.arity(), 1);
        assert_eq!(slot.declaration(), "vec3 pPosition");
    }

    #[test]
    fn parses_array_suffix() {
        let slot = Slot::parse("samples", "vec3[ 64 ]");
        assert_eq!(slot.ty(), "vec3");
        assert_eq!(slot.arity(), 64);
        assert_eq!(slot.declaration(), "vec3 samples[64]");
    }

    #[test]
    fn malformed_suffix_is_a_plain_type() {
        let slot = Slot::parse("weights", "float[n]");
        assert_eq!(slot.ty(), "float[n]");
        assert_eq!(slot.arity(), 1);
    }

    #[test]
    fn equality_ignores_arity() {
        assert_eq!(Slot::parse("kernel", "vec3[8]"), Slot::parse("kernel", "vec3"));
        assert_ne!(Slot::parse("kernel", "vec3"), Slot::parse("kernel", "vec4"));
        assert_ne!(Slot::parse("kernel", "vec3"), Slot::parse("offsets", "vec3"));
    }
}
