use std::fmt::{self, Display, Formatter};

#[derive(thiserror::Error, Debug)]
pub enum AssemblyErrorKind {
    CyclicDependency { graph: Box<[&'static str]> },
    Registered { assembly: &'static str, error: anyhow::Error },
}

impl Display for AssemblyErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AssemblyErrorKind::CyclicDependency { graph } => {
                write!(f, "Cyclic assembly dependency detected: ")?;
                for (index, name) in graph.iter().enumerate() {
                    if index > 0 {
                        write!(f, " -> ")?;
                    }
                    write!(f, "{name}")?;
                }
                Ok(())
            }
            AssemblyErrorKind::Registered { assembly, error } => {
                write!(f, "Assembly {assembly} failed after registration: {error:#}")
            }
        }
    }
}
