use std::{any::type_name, collections::BTreeSet, sync::Arc};
use tracing::{debug, error, info_span, Instrument as _};

use crate::{container::Container, errors::AssemblyErrorKind, utils::future::BoxFuture};

/// A group of registrations installed together.
///
/// Assemblies are identified by [`Assembly::name`], so an assembly reachable through
/// several dependency paths is installed once.
pub trait Assembly: Send + Sync + 'static {
    /// Adds the registrations of this assembly to `container`
    fn register(&self, container: &Container);

    /// Called after every assembly of the set has registered.
    /// Resolving from `container` here sees the full set of registrations.
    fn registered<'a>(&'a self, container: &'a Container) -> BoxFuture<'a, anyhow::Result<()>> {
        let _ = container;
        Box::pin(async { Ok(()) })
    }

    /// Assemblies that have to be installed before this one
    fn dependencies(&self) -> Vec<Arc<dyn Assembly>> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// Installs a set of assemblies into a container, dependencies first.
pub struct Assembler {
    container: Container,
    assemblies: Vec<Arc<dyn Assembly>>,
}

impl Assembler {
    #[inline]
    #[must_use]
    pub fn new(container: Container) -> Self {
        Self {
            container,
            assemblies: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with(self, assembly: impl Assembly) -> Self {
        self.with_shared(Arc::new(assembly))
    }

    #[inline]
    #[must_use]
    pub fn with_shared(mut self, assembly: Arc<dyn Assembly>) -> Self {
        self.assemblies.push(assembly);
        self
    }

    /// Assemblies in installation order: every assembly after its dependencies, each once.
    ///
    /// # Errors
    /// Returns [`AssemblyErrorKind::CyclicDependency`] if the dependencies form a cycle
    pub fn ordered(&self) -> Result<Vec<Arc<dyn Assembly>>, AssemblyErrorKind> {
        let mut visited = BTreeSet::new();
        let mut stack = Vec::new();
        let mut order = Vec::new();

        for assembly in &self.assemblies {
            if let Err(err) = dfs_visit(assembly, &mut visited, &mut stack, &mut order) {
                error!("{}", err);
                return Err(err);
            }
        }
        Ok(order)
    }

    /// Runs `register` of every assembly, then `registered` of every assembly, in installation order.
    ///
    /// # Errors
    /// - Returns [`AssemblyErrorKind::CyclicDependency`] if the dependencies form a cycle, nothing is registered then
    /// - Returns [`AssemblyErrorKind::Registered`] for the first failed `registered` callback
    pub async fn assemble(self) -> Result<Container, AssemblyErrorKind> {
        let order = self.ordered()?;

        for assembly in &order {
            let span = info_span!("register", assembly = assembly.name());
            let _guard = span.enter();

            assembly.register(&self.container);
            debug!("Registered");
        }

        for assembly in &order {
            let span = info_span!("registered", assembly = assembly.name());

            if let Err(error) = assembly.registered(&self.container).instrument(span).await {
                let err = AssemblyErrorKind::Registered {
                    assembly: assembly.name(),
                    error,
                };
                error!("{}", err);
                return Err(err);
            }
        }

        debug!(count = order.len(), "Assembled");
        Ok(self.container)
    }
}

fn dfs_visit(
    assembly: &Arc<dyn Assembly>,
    visited: &mut BTreeSet<&'static str>,
    stack: &mut Vec<&'static str>,
    order: &mut Vec<Arc<dyn Assembly>>,
) -> Result<(), AssemblyErrorKind> {
    let name = assembly.name();
    if visited.contains(name) {
        return Ok(());
    }
    if let Some(position) = stack.iter().position(|visiting| *visiting == name) {
        let mut graph = stack[position..].to_vec();
        graph.push(name);
        return Err(AssemblyErrorKind::CyclicDependency {
            graph: graph.into_boxed_slice(),
        });
    }

    stack.push(name);
    for dependency in assembly.dependencies() {
        dfs_visit(&dependency, visited, stack, order)?;
    }
    stack.pop();

    visited.insert(name);
    order.push(assembly.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use std::{convert::Infallible, sync::Arc};
    use tracing_test::traced_test;

    use super::{Assembler, Assembly};
    use crate::{container::Container, errors::AssemblyErrorKind, lifetime::Lifetime, utils::future::BoxFuture};

    type Journal = Arc<Mutex<Vec<String>>>;

    struct Config(&'static str);
    struct Pool(&'static str);

    struct ConfigAssembly(Journal);
    struct PoolAssembly(Journal);
    struct AppAssembly(Journal);

    impl Assembly for ConfigAssembly {
        fn register(&self, container: &Container) {
            self.0.lock().push("register config".to_owned());
            container.instance(Arc::new(Config("postgres://")));
        }

        fn registered<'a>(&'a self, _: &'a Container) -> BoxFuture<'a, anyhow::Result<()>> {
            Box::pin(async move {
                self.0.lock().push("registered config".to_owned());
                Ok(())
            })
        }
    }

    impl Assembly for PoolAssembly {
        fn register(&self, container: &Container) {
            self.0.lock().push("register pool".to_owned());
            container.provide(Lifetime::Singleton, |container| {
                let config = container.resolve::<Arc<Config>>()?;
                Ok::<_, crate::ResolveError>(Pool(config.0))
            });
        }

        fn registered<'a>(&'a self, container: &'a Container) -> BoxFuture<'a, anyhow::Result<()>> {
            Box::pin(async move {
                container.resolve_async::<Pool>().await?;
                self.0.lock().push("registered pool".to_owned());
                Ok(())
            })
        }

        fn dependencies(&self) -> Vec<Arc<dyn Assembly>> {
            vec![Arc::new(ConfigAssembly(self.0.clone()))]
        }
    }

    impl Assembly for AppAssembly {
        fn register(&self, container: &Container) {
            self.0.lock().push("register app".to_owned());
            container.provide(Lifetime::Transient, |_| Ok::<_, Infallible>(1_u8));
        }

        fn dependencies(&self) -> Vec<Arc<dyn Assembly>> {
            vec![Arc::new(PoolAssembly(self.0.clone())), Arc::new(ConfigAssembly(self.0.clone()))]
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_assemble_order() {
        let journal = Journal::default();

        let container = Assembler::new(Container::new())
            .with(AppAssembly(journal.clone()))
            .with(ConfigAssembly(journal.clone()))
            .assemble()
            .await
            .unwrap();

        assert_eq!(
            *journal.lock(),
            vec![
                "register config",
                "register pool",
                "register app",
                "registered config",
                "registered pool",
            ]
        );
        assert_eq!(container.resolve::<Pool>().unwrap().0, "postgres://");
        assert!(logs_contain("Assembled"));
    }

    struct Left;
    struct Right;

    impl Assembly for Left {
        fn register(&self, _: &Container) {}

        fn dependencies(&self) -> Vec<Arc<dyn Assembly>> {
            vec![Arc::new(Right)]
        }
    }

    impl Assembly for Right {
        fn register(&self, _: &Container) {}

        fn dependencies(&self) -> Vec<Arc<dyn Assembly>> {
            vec![Arc::new(Left)]
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_cyclic_dependency() {
        let err = Assembler::new(Container::new()).with(Left).assemble().await.err().unwrap();

        let AssemblyErrorKind::CyclicDependency { graph } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.first(), graph.last());
        assert!(err.to_string().contains(" -> "));
    }

    struct Failing;

    impl Assembly for Failing {
        fn register(&self, _: &Container) {}

        fn registered<'a>(&'a self, container: &'a Container) -> BoxFuture<'a, anyhow::Result<()>> {
            Box::pin(async move {
                container.resolve_async::<Pool>().await?;
                Ok(())
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_registered_error() {
        let err = Assembler::new(Container::new()).with(Failing).assemble().await.err().unwrap();

        assert!(matches!(err, AssemblyErrorKind::Registered { assembly: "failing", .. }));
    }
}
