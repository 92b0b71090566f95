//! Composite requests: optional and collection resolutions.
//!
//! Each request first looks for an exact registration of the composite type itself
//! (e.g. `Option<Arc<T>>` or `Vec<Arc<T>>`) and only synthesizes the result when there is none.

use std::{
    collections::{BTreeSet, HashSet},
    hash::Hash,
    sync::Arc,
};
use tracing::debug;

use crate::{
    config::Config,
    container::{downcast_instance, Container},
    criteria::{Criteria, TagMatch},
    errors::ResolveError,
    key::{Key, Tags},
};

impl Container {
    /// Resolves `T` under `tags`, returning `None` if it isn't registered.
    ///
    /// # Errors
    /// Failures of the factory or of its dependencies are returned as-is.
    /// With [`Config::strict_not_found`] a missing registration is an error as well.
    #[inline]
    pub fn resolve_optional<T: Send + Sync + 'static>(&self, tags: impl Into<Tags>) -> Result<Option<Arc<T>>, ResolveError> {
        self.resolve_optional_with(tags, ())
    }

    pub fn resolve_optional_with<T, A>(&self, tags: impl Into<Tags>, args: A) -> Result<Option<Arc<T>>, ResolveError>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        let tags = tags.into();

        let composite = Key::new::<Option<Arc<T>>>(tags.clone()).with_args::<A>();
        if let Some((entry, owner)) = self.lookup(&composite) {
            let instance = entry.resolve(&owner, Box::new(args))?;
            return downcast_instance::<Option<Arc<T>>>(&composite, instance).map(|optional| (*optional).clone());
        }

        let key = Key::new::<T>(tags).with_args::<A>();
        optional(self.config(), &key, self.resolve_key(&key, args))
    }

    #[inline]
    pub async fn resolve_optional_async<T: Send + Sync + 'static>(
        &self,
        tags: impl Into<Tags>,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        self.resolve_optional_with_async(tags, ()).await
    }

    pub async fn resolve_optional_with_async<T, A>(&self, tags: impl Into<Tags>, args: A) -> Result<Option<Arc<T>>, ResolveError>
    where
        T: Send + Sync + 'static,
        A: Send + 'static,
    {
        let tags = tags.into();

        let composite = Key::new::<Option<Arc<T>>>(tags.clone()).with_args::<A>();
        if let Some((entry, owner)) = self.lookup(&composite) {
            let instance = entry.resolve_async(&owner, Box::new(args)).await?;
            return downcast_instance::<Option<Arc<T>>>(&composite, instance).map(|optional| (*optional).clone());
        }

        let key = Key::new::<T>(tags).with_args::<A>();
        optional(self.config(), &key, self.resolve_key_async(&key, args).await)
    }

    /// Resolves every `T` whose tags include `tags`.
    ///
    /// Each match is resolved with its own tags and a clone of `args`, in key order.
    /// A registration of `Vec<Arc<T>>` under exactly `tags` takes precedence.
    ///
    /// # Errors
    /// The first failed resolution is returned.
    /// With [`Config::strict_not_found`] an empty result is [`crate::ResolveErrorKind::NotFound`].
    #[inline]
    pub fn resolve_all<T: Send + Sync + 'static>(&self, tags: impl Into<Tags>) -> Result<Vec<Arc<T>>, ResolveError> {
        self.resolve_all_with(tags, ())
    }

    pub fn resolve_all_with<T, A>(&self, tags: impl Into<Tags>, args: A) -> Result<Vec<Arc<T>>, ResolveError>
    where
        T: Send + Sync + 'static,
        A: Clone + Send + 'static,
    {
        let tags = tags.into();

        let composite = Key::new::<Vec<Arc<T>>>(tags.clone()).with_args::<A>();
        if let Some((entry, owner)) = self.lookup(&composite) {
            let instance = entry.resolve(&owner, Box::new(args))?;
            return downcast_instance::<Vec<Arc<T>>>(&composite, instance).map(|all| (*all).clone());
        }

        self.collection_keys::<T, A>(tags)?
            .iter()
            .map(|key| self.resolve_key(key, args.clone()))
            .collect()
    }

    #[inline]
    pub async fn resolve_all_async<T: Send + Sync + 'static>(&self, tags: impl Into<Tags>) -> Result<Vec<Arc<T>>, ResolveError> {
        self.resolve_all_with_async(tags, ()).await
    }

    pub async fn resolve_all_with_async<T, A>(&self, tags: impl Into<Tags>, args: A) -> Result<Vec<Arc<T>>, ResolveError>
    where
        T: Send + Sync + 'static,
        A: Clone + Send + 'static,
    {
        let tags = tags.into();

        let composite = Key::new::<Vec<Arc<T>>>(tags.clone()).with_args::<A>();
        if let Some((entry, owner)) = self.lookup(&composite) {
            let instance = entry.resolve_async(&owner, Box::new(args)).await?;
            return downcast_instance::<Vec<Arc<T>>>(&composite, instance).map(|all| (*all).clone());
        }

        let keys = self.collection_keys::<T, A>(tags)?;
        let mut instances = Vec::with_capacity(keys.len());
        for key in &keys {
            instances.push(self.resolve_key_async(key, args.clone()).await?);
        }
        Ok(instances)
    }

    /// Same as [`Container::resolve_all`], but equal instances are collapsed
    #[inline]
    pub fn resolve_set<T>(&self, tags: impl Into<Tags>) -> Result<HashSet<Arc<T>>, ResolveError>
    where
        T: Hash + Eq + Send + Sync + 'static,
    {
        self.resolve_set_with(tags, ())
    }

    pub fn resolve_set_with<T, A>(&self, tags: impl Into<Tags>, args: A) -> Result<HashSet<Arc<T>>, ResolveError>
    where
        T: Hash + Eq + Send + Sync + 'static,
        A: Clone + Send + 'static,
    {
        let tags = tags.into();

        let composite = Key::new::<HashSet<Arc<T>>>(tags.clone()).with_args::<A>();
        if let Some((entry, owner)) = self.lookup(&composite) {
            let instance = entry.resolve(&owner, Box::new(args))?;
            return downcast_instance::<HashSet<Arc<T>>>(&composite, instance).map(|set| (*set).clone());
        }

        self.collection_keys::<T, A>(tags)?
            .iter()
            .map(|key| self.resolve_key(key, args.clone()))
            .collect()
    }

    #[inline]
    pub async fn resolve_set_async<T>(&self, tags: impl Into<Tags>) -> Result<HashSet<Arc<T>>, ResolveError>
    where
        T: Hash + Eq + Send + Sync + 'static,
    {
        self.resolve_set_with_async(tags, ()).await
    }

    pub async fn resolve_set_with_async<T, A>(&self, tags: impl Into<Tags>, args: A) -> Result<HashSet<Arc<T>>, ResolveError>
    where
        T: Hash + Eq + Send + Sync + 'static,
        A: Clone + Send + 'static,
    {
        let tags = tags.into();

        let composite = Key::new::<HashSet<Arc<T>>>(tags.clone()).with_args::<A>();
        if let Some((entry, owner)) = self.lookup(&composite) {
            let instance = entry.resolve_async(&owner, Box::new(args)).await?;
            return downcast_instance::<HashSet<Arc<T>>>(&composite, instance).map(|set| (*set).clone());
        }

        let keys = self.collection_keys::<T, A>(tags)?;
        let mut instances = HashSet::with_capacity(keys.len());
        for key in &keys {
            instances.insert(self.resolve_key_async(key, args.clone()).await?);
        }
        Ok(instances)
    }

    fn collection_keys<T: 'static, A: 'static>(&self, tags: Tags) -> Result<BTreeSet<Key>, ResolveError> {
        let criteria = Criteria::of::<T>()
            .with_tags(tags)
            .matching(TagMatch::Subset)
            .with_args::<A>();
        let keys = self.find(&criteria);

        if keys.is_empty() && self.config().strict_not_found {
            let err = ResolveError::not_found(Key::new::<T>(criteria.tags().clone()).with_args::<A>());
            debug!("{}", err);
            return Err(err);
        }

        debug!(count = keys.len(), "Collection keys found");
        Ok(keys)
    }
}

fn optional<T>(config: Config, key: &Key, result: Result<Arc<T>, ResolveError>) -> Result<Option<Arc<T>>, ResolveError> {
    match result {
        Ok(instance) => Ok(Some(instance)),
        Err(err) if err.is_not_found_for(key) && !config.strict_not_found => {
            debug!("Not registered, resolved as none");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
