//! Persistence session trait

use crate::error::{Error, Result};
use crate::model::{Handle, Instance, Object};

/// Upper bound on proxy-to-proxy hops during a force-load
const MAX_PROXY_HOPS: usize = 16;

/// Access to the live objects of a persistence context
///
/// The exporter never holds on to objects between calls; everything is
/// looked up through handles.
pub trait Session {
    /// Look up the object behind a handle without initializing it
    fn lookup(&self, handle: Handle) -> Result<&Object>;

    /// Force-load a handle, following lazy proxies to their backing instance
    fn initialize(&self, handle: Handle) -> Result<Handle> {
        let mut current = handle;
        for _ in 0..MAX_PROXY_HOPS {
            match self.lookup(current)? {
                Object::Instance(_) => return Ok(current),
                Object::Proxy(proxy) => match proxy.target {
                    Some(target) => current = target,
                    None => {
                        return Err(Error::identity(format!(
                            "lazy proxy {} ({}) could not be initialized",
                            current, proxy.class_name
                        )))
                    }
                },
            }
        }
        Err(Error::identity(format!(
            "lazy proxy {} did not resolve within {} hops",
            handle, MAX_PROXY_HOPS
        )))
    }

    /// Force-load a handle and return its backing instance
    fn instance(&self, handle: Handle) -> Result<&Instance> {
        let loaded = self.initialize(handle)?;
        match self.lookup(loaded)? {
            Object::Instance(instance) => Ok(instance),
            Object::Proxy(_) => Err(Error::reflection(format!(
                "object {} is still a proxy after initialization",
                loaded
            ))),
        }
    }
}

/// Plain arena session over a vector of objects
impl Session for Vec<Object> {
    fn lookup(&self, handle: Handle) -> Result<&Object> {
        self.get(handle.0)
            .ok_or_else(|| Error::reflection(format!("no object behind handle {}", handle)))
    }
}
