//! Dispatch façade
//!
//! The public entry surface over the registry: direct call-as-function,
//! broadcast `invoke`, multi-method `invoke_all`, and the reducing
//! `exec`/`exec_async`. Every entry resolves its namespace through the
//! address parser, creating the point lazily, and honors the `#id`
//! selector by dispatching to the single named extension instead of
//! broadcasting or reducing across all of them.

use crate::address::Address;
use crate::error::{AddressError, RegistryError};
use crate::extension::Extension;
use crate::point::Point;
use crate::registry::Registry;
use plexus_core::{Context, Value};
use std::sync::Arc;

fn named_extension(point: &Point, namespace: &str, id: &str) -> Result<Arc<Extension>, RegistryError> {
    point.get_exact(id).ok_or_else(|| RegistryError::UnknownExtension {
        point: namespace.to_string(),
        id: id.to_string(),
    })
}

impl Registry {
    /// Direct call-as-function.
    ///
    /// With `#id`, calls the requested method(s) on the named extension:
    /// a scalar for one method, a `Value::List` for several. Without an
    /// id, broadcasts the single named method and returns the collected
    /// results as a `Value::List`.
    pub fn call(
        &mut self,
        ctx: Option<&Context>,
        address: &str,
        args: &[Value],
    ) -> Result<Value, RegistryError> {
        let addr = Address::parse(address)?;
        let point = self.point(addr.namespace());

        if let Some(id) = addr.id() {
            let ext = named_extension(point, addr.namespace(), id)?;
            let ctx = ctx.cloned().unwrap_or_default();
            let mut results: Vec<Value> = addr
                .methods()
                .iter()
                .map(|method| ext.invoke(&ctx, method, args))
                .collect();
            return Ok(if results.len() == 1 {
                results.swap_remove(0)
            } else {
                Value::List(results)
            });
        }

        let method = addr.single_method()?;
        Ok(Value::List(point.invoke(ctx, method, args)))
    }

    /// Broadcast a single method, one result slot per visible extension.
    /// With `#id`, the collection holds only the named extension's result.
    pub fn invoke(
        &mut self,
        ctx: Option<&Context>,
        address: &str,
        args: &[Value],
    ) -> Result<Vec<Value>, RegistryError> {
        let addr = Address::parse(address)?;
        let method = addr.single_method()?;
        let point = self.point(addr.namespace());

        if let Some(id) = addr.id() {
            let ext = named_extension(point, addr.namespace(), id)?;
            let ctx = ctx.cloned().unwrap_or_default();
            return Ok(vec![ext.invoke(&ctx, method, args)]);
        }
        Ok(point.invoke(ctx, method, args))
    }

    /// Broadcast with sequential awaiting of async capabilities
    pub async fn invoke_async(
        &mut self,
        ctx: Option<&Context>,
        address: &str,
        args: &[Value],
    ) -> Result<Vec<Value>, RegistryError> {
        let addr = Address::parse(address)?;
        let method = addr.single_method()?;
        let point = self.point(addr.namespace());

        if let Some(id) = addr.id() {
            let ext = named_extension(point, addr.namespace(), id)?;
            let ctx = ctx.cloned().unwrap_or_default();
            return Ok(vec![ext.invoke_async(&ctx, method, args.to_vec()).await]);
        }
        Ok(point.invoke_async(ctx, method, args).await)
    }

    /// Call every method named by the address, in declaration order,
    /// collecting one value per method. A method whose broadcast collects
    /// exactly one value is unwrapped to that scalar; otherwise the full
    /// list is kept.
    pub fn invoke_all(
        &mut self,
        ctx: Option<&Context>,
        address: &str,
        args: &[Value],
    ) -> Result<Vec<Value>, RegistryError> {
        let addr = Address::parse(address)?;
        let point = self.point(addr.namespace());

        if let Some(id) = addr.id() {
            let ext = named_extension(point, addr.namespace(), id)?;
            let ctx = ctx.cloned().unwrap_or_default();
            return Ok(addr
                .methods()
                .iter()
                .map(|method| ext.invoke(&ctx, method, args))
                .collect());
        }

        let mut collected = Vec::with_capacity(addr.methods().len());
        for method in addr.methods() {
            let mut values = point.invoke(ctx, method, args);
            if values.len() == 1 {
                collected.push(values.swap_remove(0));
            } else {
                collected.push(Value::List(values));
            }
        }
        Ok(collected)
    }

    /// Sequential reduction across the addressed point. With `#id`, calls
    /// the method directly on the named extension instead.
    pub fn exec(
        &mut self,
        ctx: Option<&Context>,
        address: &str,
        args: &[Value],
    ) -> Result<Value, RegistryError> {
        let addr = Address::parse(address)?;
        let method = addr.single_method()?;
        let point = self.point(addr.namespace());

        if let Some(id) = addr.id() {
            let ext = named_extension(point, addr.namespace(), id)?;
            let ctx = ctx.cloned().unwrap_or_default();
            return Ok(ext.invoke(&ctx, method, args));
        }
        Ok(point.exec(ctx, method, args))
    }

    /// Async sequential reduction: each step awaited before the next
    pub async fn exec_async(
        &mut self,
        ctx: Option<&Context>,
        address: &str,
        args: &[Value],
    ) -> Result<Value, RegistryError> {
        let addr = Address::parse(address)?;
        let method = addr.single_method()?;
        let point = self.point(addr.namespace());

        if let Some(id) = addr.id() {
            let ext = named_extension(point, addr.namespace(), id)?;
            let ctx = ctx.cloned().unwrap_or_default();
            return Ok(ext.invoke_async(&ctx, method, args.to_vec()).await);
        }
        Ok(point.exec_async(ctx, method, args).await)
    }

    /// Resolve `namespace.method#id` to the stored extension
    pub fn get_by_id(&mut self, address: &str) -> Result<Arc<Extension>, RegistryError> {
        let addr = Address::parse(address)?;
        let id = addr
            .id()
            .ok_or_else(|| AddressError::MissingId(address.to_string()))?;
        let point = self.point(addr.namespace());
        named_extension(point, addr.namespace(), id)
    }
}
