//! The sync engine.
//!
//! [`Mirror`] orchestrates CRUD flows through a [`Transport`], merges
//! responses into the active namespace's store and schedules change
//! notifications. There is no global state machine: every call runs its own
//! flow.
//!
//! ## Concurrency
//!
//! Store state sits behind one lock that is never held across an `.await`.
//! Every store read or write, and the whole namespace switch, is therefore
//! atomic with respect to other calls. Suspension points are the transport
//! call, validation hooks and relation fetches.

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::options::{CreateOptions, ExpandOptions, FetchOptions, ScopeContext};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};
use crate::url;
use crate::validation;
use futures::future::join_all;
use parking_lot::Mutex;
use restmirror_core::record::{identity_of, local_key_of, start_case};
use restmirror_core::relation::{assemble, plan, reduce};
use restmirror_core::{
    ChangeEvent, ChangeFeed, ChangeNotifier, Key, MergeOptions, Merged, NamespaceManager,
    Payload, Query, Record, Schema, SwitchOutcome, TypeSchema, LOCAL_CREATE_TIME, URL_ATTR,
};
use restmirror_storage::CacheBackend;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

struct Inner {
    schema: Schema,
    config: SyncConfig,
    transport: Arc<dyn Transport>,
    cache: Option<Arc<dyn CacheBackend>>,
    state: Mutex<NamespaceManager>,
    feed: Arc<ChangeFeed>,
    notifier: ChangeNotifier,
    local_counter: AtomicU64,
}

/// Builder for [`Mirror`].
pub struct MirrorBuilder {
    schema: Schema,
    config: SyncConfig,
    transport: Option<Arc<dyn Transport>>,
    cache: Option<Arc<dyn CacheBackend>>,
    feed: Option<Arc<ChangeFeed>>,
}

impl MirrorBuilder {
    /// Sets the transport. Defaults to the `reqwest` transport.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the persistent cache.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn CacheBackend>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Publishes to an existing feed instead of a private one.
    #[must_use]
    pub fn feed(mut self, feed: Arc<ChangeFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Builds the mirror.
    ///
    /// With `persist` enabled and a cache configured, every type of the
    /// initial namespace is hydrated silently from the cache.
    ///
    /// # Errors
    ///
    /// Fails if the default transport cannot be created or a cache entry is
    /// unreadable.
    pub fn build(self) -> SyncResult<Mirror> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => default_transport(&self.config)?,
        };
        let core = &self.config.core;
        let feed = self
            .feed
            .unwrap_or_else(|| Arc::new(ChangeFeed::with_max_history(core.feed_history)));
        let notifier = ChangeNotifier::new(feed.clone(), core.change_debounce);
        let state = NamespaceManager::new(core.identity_field.clone(), core.initial_namespace.clone());

        let mirror = Mirror {
            inner: Arc::new(Inner {
                schema: self.schema,
                config: self.config,
                transport,
                cache: self.cache,
                state: Mutex::new(state),
                feed,
                notifier,
                local_counter: AtomicU64::new(0),
            }),
        };

        if mirror.persisting() {
            let weak = Arc::downgrade(&mirror.inner);
            mirror.inner.notifier.on_flush(move |type_name| mirror_to_cache(&weak, type_name));
            for type_name in mirror.inner.schema.type_names() {
                mirror.hydrate(&type_name)?;
            }
        }
        Ok(mirror)
    }
}

#[cfg(feature = "http")]
fn default_transport(config: &SyncConfig) -> SyncResult<Arc<dyn Transport>> {
    Ok(Arc::new(crate::http::HttpTransport::new(config.timeout)?))
}

#[cfg(not(feature = "http"))]
fn default_transport(_config: &SyncConfig) -> SyncResult<Arc<dyn Transport>> {
    Err(SyncError::network("no transport configured"))
}

fn mirror_to_cache(inner: &Weak<Inner>, type_name: &str) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mirror = Mirror { inner };
    let result = mirror
        .find_all(type_name, None)
        .and_then(|records| mirror.set_cache(type_name, &records));
    if let Err(e) = result {
        tracing::warn!(type_name, error = %e, "failed to mirror type to cache");
    }
}

/// Client-side mirror of a REST API.
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct Mirror {
    inner: Arc<Inner>,
}

impl Mirror {
    /// Starts building a mirror.
    pub fn builder(schema: Schema, config: SyncConfig) -> MirrorBuilder {
        MirrorBuilder {
            schema,
            config,
            transport: None,
            cache: None,
            feed: None,
        }
    }

    /// Creates a mirror over `transport` without a cache.
    ///
    /// # Errors
    ///
    /// See [`MirrorBuilder::build`].
    pub fn new(schema: Schema, config: SyncConfig, transport: Arc<dyn Transport>) -> SyncResult<Self> {
        Self::builder(schema, config).transport(transport).build()
    }

    /// Returns the schema registry.
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// Returns the change notifier.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.inner.notifier
    }

    /// Returns the change feed.
    pub fn feed(&self) -> &Arc<ChangeFeed> {
        &self.inner.feed
    }

    /// Subscribes to change events.
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        self.inner.feed.subscribe()
    }

    /// Returns the active namespace id.
    pub fn active_namespace(&self) -> String {
        self.inner.state.lock().active_id().to_string()
    }

    // ------------------------------------------------------------------
    // Local queries and mutations
    // ------------------------------------------------------------------

    /// Finds one record in the active store.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types.
    pub fn find(&self, type_name: &str, query: Option<&Query>) -> SyncResult<Option<Record>> {
        Ok(self
            .inner
            .state
            .lock()
            .store()
            .find(&self.inner.schema, type_name, query)?)
    }

    /// Finds every matching record in the active store.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types and key queries.
    pub fn find_all(&self, type_name: &str, query: Option<&Query>) -> SyncResult<Vec<Record>> {
        Ok(self
            .inner
            .state
            .lock()
            .store()
            .find_all(&self.inner.schema, type_name, query)?)
    }

    /// Merges records into the active store and schedules a notification
    /// unless `options.silent` is set.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types and undecodable text.
    pub fn merge(
        &self,
        type_name: &str,
        payload: impl Into<Payload>,
        options: MergeOptions,
    ) -> SyncResult<Merged> {
        let merged = self.inner.state.lock().store_mut().merge(
            &self.inner.schema,
            type_name,
            payload,
            options,
        )?;
        if !options.silent {
            self.inner.notifier.schedule(type_name);
        }
        Ok(merged)
    }

    /// Deletes a record locally under both its temporary key and its
    /// identity, then schedules a notification.
    ///
    /// Returns true if anything was stored.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types.
    pub fn delete_local(&self, type_name: &str, record: &Record) -> SyncResult<bool> {
        let type_schema = self.inner.schema.get(type_name)?;
        let identity_field = self.identity_field(type_schema);
        let keys: Vec<Key> = [local_key_of(record), identity_of(record, identity_field)]
            .into_iter()
            .flatten()
            .collect();

        let removed = {
            let mut state = self.inner.state.lock();
            let store = state.store_mut();
            keys.iter()
                .filter(|key| store.delete(type_name, key).is_some())
                .count()
        };
        self.inner.notifier.schedule(type_name);
        Ok(removed > 0)
    }

    // ------------------------------------------------------------------
    // Remote flows
    // ------------------------------------------------------------------

    /// Fetches records of a type and merges them.
    ///
    /// A plain fetch (no parameters, no url override) is a full list:
    /// records missing from the response are pruned.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types, missing scope values, transport
    /// failures and error responses.
    pub async fn fetch(&self, type_name: &str, options: FetchOptions) -> SyncResult<Merged> {
        let type_schema = self.inner.schema.get(type_name)?;
        let plain = options.is_plain();
        {
            let mut state = self.inner.state.lock();
            if plain {
                state.mark_fetched(type_name);
            }
            if type_schema.segment && state.is_base() {
                return Ok(Merged::Many(Vec::new()));
            }
        }

        let mut params = options.params.unwrap_or_default();
        if type_schema.local_only {
            return self.fetch_local(type_name, &params);
        }

        let identity_field = self.identity_field(type_schema);
        let narrowing = !params.is_empty();
        if let Some(scope) = &type_schema.scope {
            let value = options
                .scope
                .get(scope)
                .ok_or_else(|| SyncError::MissingScope {
                    scope: scope.clone(),
                    type_name: type_name.to_string(),
                })?;
            params.insert("scopeType".into(), Value::String(scope.clone()));
            params.insert("scopeId".into(), Value::String(value.to_string()));
        }

        let (base, skip) = match &options.url {
            Some(over) => (url::resolve(&self.inner.config.api_url, over), None),
            None => {
                let base = url::type_url(&self.inner.config.api_url, &self.inner.schema, type_name)?;
                match params.get(identity_field).and_then(Key::from_value) {
                    Some(identity) => (url::resource_url(&base, &identity), Some(identity_field)),
                    None => (base, None),
                }
            }
        };
        let target = url::with_query(&base, &url::querystring(&params, skip));

        tracing::debug!(type_name, url = target.as_str(), "fetching");
        let response = self.send(HttpRequest::new(Method::Get, target)).await?;
        let Some(body) = check_response(response)? else {
            return Ok(Merged::Many(Vec::new()));
        };

        let options = MergeOptions {
            silent: false,
            prune_missing: !narrowing && options.url.is_none(),
        };
        self.merge(type_name, body, options)
    }

    /// Alias of [`Mirror::fetch`].
    ///
    /// # Errors
    ///
    /// See [`Mirror::fetch`].
    pub async fn get(&self, type_name: &str, options: FetchOptions) -> SyncResult<Merged> {
        self.fetch(type_name, options).await
    }

    fn fetch_local(&self, type_name: &str, params: &Record) -> SyncResult<Merged> {
        if params.contains_key(LOCAL_CREATE_TIME) {
            let found = self.find(type_name, Some(&Query::Match(params.clone())))?;
            return Ok(found.map_or(Merged::Many(Vec::new()), Merged::One));
        }
        let query = (!params.is_empty()).then(|| Query::Match(params.clone()));
        Ok(Merged::Many(self.find_all(type_name, query.as_ref())?))
    }

    /// Creates a record.
    ///
    /// Without `persist` (and always for local-only types) the record gets
    /// a fresh temporary key and is stored locally. With `persist` it is
    /// POSTed and the server's answer is merged, promoting any temporary
    /// key to the assigned identity.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SaveFailed`] for an empty create response, and
    /// transport or response errors.
    pub async fn create(
        &self,
        type_name: &str,
        mut record: Record,
        options: CreateOptions,
    ) -> SyncResult<Record> {
        let type_schema = self.inner.schema.get(type_name)?;
        self.reduce(type_schema, &mut record);

        if !options.persist || type_schema.local_only {
            record.insert(LOCAL_CREATE_TIME.into(), Value::String(self.next_local_key()));
            let merge = MergeOptions {
                silent: options.silent,
                prune_missing: false,
            };
            self.merge(type_name, record.clone(), merge)?;
            return Ok(record);
        }

        let target = match &options.url {
            Some(over) => url::resolve(&self.inner.config.api_url, over),
            None => url::type_url(&self.inner.config.api_url, &self.inner.schema, type_name)?,
        };
        let body = self.outbound_body(type_name, &record)?;
        let response = self
            .send(HttpRequest::new(Method::Post, target).with_json(body))
            .await?;

        let created = match check_response(response)? {
            None | Some(Value::Null) => {
                return Err(SyncError::save_failed("invalid response from server"))
            }
            Some(value) if self.inner.config.entity_root => {
                let mut value = value;
                match value.get_mut(start_case(type_name)).map(Value::take) {
                    Some(inner) if !inner.is_null() => inner,
                    _ => return Err(SyncError::save_failed("response is missing the entity root")),
                }
            }
            Some(value) => value,
        };

        let mut saved = record.clone();
        match created {
            Value::Object(fields) => saved.extend(fields),
            other => {
                return Err(SyncError::save_failed(format!(
                    "expected an object in the create response, got {other}"
                )))
            }
        }

        self.run_hooks(type_name, type_schema, &record, &saved).await;
        self.merge(type_name, saved.clone(), MergeOptions::default())?;
        Ok(saved)
    }

    /// Alias of [`Mirror::create`].
    ///
    /// # Errors
    ///
    /// See [`Mirror::create`].
    pub async fn add(
        &self,
        type_name: &str,
        record: Record,
        options: CreateOptions,
    ) -> SyncResult<Record> {
        self.create(type_name, record, options).await
    }

    /// Updates a record.
    ///
    /// Records with a `url` or an identity are PUT and the response merged
    /// back; an empty response merges the sent record. Temporary-keyed
    /// records, and every record of a local-only type, merge locally.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingIdentity`] when the record has no url,
    /// identity or temporary key, and transport or response errors.
    pub async fn update(&self, type_name: &str, mut record: Record) -> SyncResult<Record> {
        let type_schema = self.inner.schema.get(type_name)?;
        self.reduce(type_schema, &mut record);

        let before = self.stored_version(type_name, type_schema, &record);
        let Some(target) = self.record_url(type_name, type_schema, &record)? else {
            if type_schema.local_only || local_key_of(&record).is_some() {
                self.run_hooks(type_name, type_schema, &before, &record).await;
                self.merge(type_name, record.clone(), MergeOptions::default())?;
                return Ok(record);
            }
            return Err(SyncError::MissingIdentity {
                identity_field: self.identity_field(type_schema).to_string(),
            });
        };

        let body = self.outbound_body(type_name, &record)?;
        let response = self
            .send(HttpRequest::new(Method::Put, target).with_json(body))
            .await?;
        let body = check_response(response)?;

        self.run_hooks(type_name, type_schema, &before, &record).await;
        let merged = match body {
            None | Some(Value::Null) => self.merge(type_name, record.clone(), MergeOptions::default())?,
            Some(value) => self.merge(type_name, value, MergeOptions::default())?,
        };
        Ok(merged.into_first().unwrap_or(record))
    }

    /// Removes a record.
    ///
    /// Records with a `url` or an identity are DELETEd first; a
    /// temporary-keyed record without either is removed locally only.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MissingIdentity`] when the record has no url,
    /// identity or temporary key, and transport or response errors.
    pub async fn remove(&self, type_name: &str, record: &Record) -> SyncResult<()> {
        let type_schema = self.inner.schema.get(type_name)?;
        let Some(target) = self.record_url(type_name, type_schema, record)? else {
            if type_schema.local_only || local_key_of(record).is_some() {
                self.delete_local(type_name, record)?;
                return Ok(());
            }
            return Err(SyncError::MissingIdentity {
                identity_field: self.identity_field(type_schema).to_string(),
            });
        };

        let body = self.outbound_body(type_name, record)?;
        let response = self
            .send(HttpRequest::new(Method::Delete, target).with_json(body))
            .await?;
        check_response(response)?;
        self.delete_local(type_name, record)?;
        Ok(())
    }

    /// Returns a copy of `record` with relation attributes replaced by the
    /// related records.
    ///
    /// Each identity is looked up in the active store first and fetched
    /// remotely when missing. All lookups run concurrently. Foreign keys
    /// become one object, one-to-many attributes an array in identity
    /// order; unresolved identities become `null`. Related records are not
    /// themselves expanded.
    ///
    /// # Errors
    ///
    /// Returns the first lookup failure, after every lookup has settled.
    pub async fn expand(
        &self,
        type_name: &str,
        record: &Record,
        options: ExpandOptions,
    ) -> SyncResult<Record> {
        let type_schema = self.inner.schema.get(type_name)?;
        let only: Option<Vec<&str>> = options
            .only
            .as_ref()
            .map(|attrs| attrs.iter().map(String::as_str).collect());
        let refs = plan(
            &self.inner.schema,
            type_schema,
            &self.inner.config.core.identity_field,
            record,
            only.as_deref(),
        );

        let scope = &options.scope;
        let lookups = refs.iter().map(|relation| {
            join_all(
                relation
                    .identities
                    .iter()
                    .map(|identity| self.resolve(&relation.target, identity.as_ref(), scope)),
            )
        });
        let settled = join_all(lookups).await;

        let mut resolved = Vec::with_capacity(settled.len());
        for results in settled {
            resolved.push(results.into_iter().collect::<SyncResult<Vec<_>>>()?);
        }
        Ok(assemble(record, &refs, resolved))
    }

    async fn resolve(
        &self,
        target: &str,
        identity: Option<&Key>,
        scope: &ScopeContext,
    ) -> SyncResult<Option<Record>> {
        let Some(identity) = identity else {
            return Ok(None);
        };
        if let Some(found) = self.find(target, Some(&Query::Key(identity.clone())))? {
            return Ok(Some(found));
        }

        let target_schema = self.inner.schema.get(target)?;
        let identity_field = self.identity_field(target_schema).to_string();
        tracing::debug!(target, identity = %identity, "related record not cached, fetching");
        let merged = self
            .fetch(
                target,
                FetchOptions::new()
                    .param(identity_field, identity.as_str())
                    .scope(scope.clone()),
            )
            .await?;
        Ok(merged.into_first())
    }

    // ------------------------------------------------------------------
    // Namespaces and cache
    // ------------------------------------------------------------------

    /// Activates namespace `id`.
    ///
    /// On first activation with persistence enabled, empty types that are
    /// not pending refetch are hydrated from the cache. Segment types
    /// fetched before are then refetched; refetch errors are returned after
    /// every refetch has run. Pending change notifications are flushed
    /// first, so each type is mirrored into the namespace it changed in.
    ///
    /// # Errors
    ///
    /// Returns an error for the reserved base namespace, unreadable cache
    /// entries and failed refetches.
    pub async fn switch_namespace(&self, id: &str, scope: &ScopeContext) -> SyncResult<SwitchOutcome> {
        // Pending timers mirror whatever namespace is active when they fire.
        if id != self.active_namespace() {
            self.inner.notifier.flush_all();
        }
        let outcome = self.inner.state.lock().switch(id, &self.inner.schema)?;
        if !outcome.changed {
            return Ok(outcome);
        }

        if outcome.first_activation && self.persisting() {
            for type_name in self.inner.schema.type_names() {
                if outcome.refetch.contains(&type_name) {
                    continue;
                }
                let empty = self.inner.state.lock().store().is_empty(&type_name);
                if empty {
                    self.hydrate(&type_name)?;
                }
            }
        }

        let refetches = outcome.refetch.iter().map(|type_name| {
            self.fetch(type_name, FetchOptions::new().scope(scope.clone()))
        });
        for result in join_all(refetches).await {
            result?;
        }
        Ok(outcome)
    }

    /// Writes `records` to the cache entry of `type_name` in the active
    /// namespace. No-op without a cache.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types and cache failures.
    pub fn set_cache(&self, type_name: &str, records: &[Record]) -> SyncResult<()> {
        self.inner.schema.get(type_name)?;
        let Some(cache) = &self.inner.cache else {
            return Ok(());
        };
        let namespace = self.active_namespace();
        cache.set(&namespace, type_name, &serde_json::to_string(records)?)?;
        Ok(())
    }

    /// Reads the cache entry of `type_name` in the active namespace.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown types, cache failures and undecodable
    /// entries.
    pub fn get_cache(&self, type_name: &str) -> SyncResult<Option<Vec<Record>>> {
        self.inner.schema.get(type_name)?;
        let Some(cache) = &self.inner.cache else {
            return Ok(None);
        };
        let namespace = self.active_namespace();
        match cache.get(&namespace, type_name)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn hydrate(&self, type_name: &str) -> SyncResult<bool> {
        let Some(cache) = &self.inner.cache else {
            return Ok(false);
        };
        let namespace = self.active_namespace();
        let Some(text) = cache.get(&namespace, type_name)? else {
            return Ok(false);
        };
        let merged = self.merge(type_name, text, MergeOptions::silent())?;
        tracing::debug!(
            namespace = namespace.as_str(),
            type_name,
            records = merged.len(),
            "hydrated from cache"
        );
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn persisting(&self) -> bool {
        self.inner.config.core.persist && self.inner.cache.is_some()
    }

    fn identity_field<'a>(&'a self, type_schema: &'a TypeSchema) -> &'a str {
        type_schema.identity_or(&self.inner.config.core.identity_field)
    }

    fn reduce(&self, type_schema: &TypeSchema, record: &mut Record) {
        reduce(
            &self.inner.schema,
            type_schema,
            &self.inner.config.core.identity_field,
            record,
        );
    }

    fn next_local_key(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let counter = self.inner.local_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{millis}{counter}")
    }

    fn stored_version(&self, type_name: &str, type_schema: &TypeSchema, record: &Record) -> Record {
        let identity_field = self.identity_field(type_schema);
        let state = self.inner.state.lock();
        let store = state.store();
        local_key_of(record)
            .and_then(|key| store.get(type_name, &key))
            .or_else(|| identity_of(record, identity_field).and_then(|key| store.get(type_name, &key)))
            .cloned()
            .unwrap_or_else(|| record.clone())
    }

    /// Url of an existing record: its `url` attribute, else the type url
    /// plus its identity. `None` for local-only types and keyless records.
    fn record_url(
        &self,
        type_name: &str,
        type_schema: &TypeSchema,
        record: &Record,
    ) -> SyncResult<Option<String>> {
        if type_schema.local_only {
            return Ok(None);
        }
        if let Some(Value::String(link)) = record.get(URL_ATTR) {
            return Ok(Some(url::resolve(&self.inner.config.api_url, link)));
        }
        match identity_of(record, self.identity_field(type_schema)) {
            Some(identity) => {
                let base = url::type_url(&self.inner.config.api_url, &self.inner.schema, type_name)?;
                Ok(Some(url::resource_url(&base, &identity)))
            }
            None => Ok(None),
        }
    }

    fn outbound_body(&self, type_name: &str, record: &Record) -> SyncResult<String> {
        let body = if self.inner.config.entity_root {
            let mut wrapper = Record::new();
            wrapper.insert(start_case(type_name), Value::Object(record.clone()));
            serde_json::to_string(&wrapper)?
        } else {
            serde_json::to_string(record)?
        };
        Ok(body)
    }

    async fn run_hooks(
        &self,
        type_name: &str,
        type_schema: &TypeSchema,
        before: &Record,
        after: &Record,
    ) {
        let identity_field = self.identity_field(type_schema);
        validation::run_after_update(type_name, identity_field, type_schema, before, after).await;
    }

    async fn send(&self, request: HttpRequest) -> SyncResult<HttpResponse> {
        let request = request.with_headers(self.inner.config.resolve_headers());
        self.inner.transport.send(request).await
    }
}

impl fmt::Debug for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mirror")
            .field("api_url", &self.inner.config.api_url)
            .field("types", &self.inner.schema.type_names())
            .field("namespace", &self.active_namespace())
            .field("cache", &self.inner.cache.is_some())
            .finish()
    }
}

/// Checks a response and decodes its body.
///
/// Returns `None` for an empty body.
fn check_response(response: HttpResponse) -> SyncResult<Option<Value>> {
    let text = response.body.trim();
    let decoded: Option<Value> = if text.is_empty() {
        None
    } else {
        match serde_json::from_str(text) {
            Ok(value) => Some(value),
            Err(e) if response.is_success() => return Err(e.into()),
            Err(_) => None,
        }
    };

    if !response.is_success() {
        let message = decoded
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| format!("request failed with status code {}", response.status));
        return Err(SyncError::status(response.status, message));
    }
    if let Some(message) = decoded.as_ref().and_then(error_message) {
        return Err(SyncError::Remote { message });
    }
    Ok(decoded)
}

fn error_message(body: &Value) -> Option<String> {
    match body.get("errorMessage")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
