//! The iterative root-finding methods the external renderer can be built around.
//!
//! The engine itself never runs a method; the table only records what each method is called,
//! the template-parameter string spliced after its name, and whether its update step consumes
//! the symbolic derivative. The driver refuses to differentiate when the selected method does
//! not require it.

/// One entry of the method table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Method {
    /// The method's name, as recorded in the session header.
    pub name: &'static str,

    /// The template parameters spliced after the name, e.g. `<7>`. Possibly empty.
    pub params: &'static str,

    /// Whether the method's update step uses the symbolic derivative.
    pub needs_derivative: bool,
}

/// The fixed method table.
pub const METHODS: [Method; 7] = [
    Method { name: "Contractor", params: "", needs_derivative: false },
    Method { name: "InvertedContractor", params: "", needs_derivative: false },
    Method { name: "LogContractor", params: "", needs_derivative: false },
    Method { name: "Newton", params: "", needs_derivative: true },
    Method { name: "Chord", params: "", needs_derivative: false },
    Method { name: "Steffensen", params: "", needs_derivative: false },
    Method { name: "Sidi", params: "<7>", needs_derivative: false },
];

/// The method used when none is selected.
pub const DEFAULT_METHOD: &Method = &METHODS[3];

/// The norms the renderer understands for its convergence checks.
pub const NORMS: [&str; 4] = ["norm2", "norm1", "normInf", "normC"];

impl Method {
    /// Looks a method up by name.
    pub fn find(name: &str) -> Option<&'static Method> {
        METHODS.iter().find(|method| method.name == name)
    }

    /// The full template argument the renderer source expects, name and parameters joined.
    pub fn template_arg(&self) -> String {
        format!("{}{}", self.name, self.params)
    }
}
