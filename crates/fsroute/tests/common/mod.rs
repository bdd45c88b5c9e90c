//! Shared fixtures for the integration tests
#![allow(dead_code)]

use fsroute::{
    create_resolver, BoxFuture, ModuleTable, Request, RequestContext, ResolveError, Resolver,
    ResolverConfig, RouteModule,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Request context carrying a call log next to the request
#[derive(Debug, Default)]
pub struct Ctx {
    pub req: Request,
    pub log: Vec<String>,
}

impl Ctx {
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            req: Request::new(method, url),
            log: Vec::new(),
        }
    }
}

impl RequestContext for Ctx {
    fn request(&self) -> &Request {
        &self.req
    }

    fn request_mut(&mut self) -> &mut Request {
        &mut self.req
    }
}

/// Handler appending `label` to the context log
pub fn record(
    label: &'static str,
) -> impl for<'a> Fn(&'a mut Ctx) -> BoxFuture<'a, anyhow::Result<()>> + Send + Sync + 'static {
    move |ctx| {
        Box::pin(async move {
            ctx.log.push(label.to_string());
            anyhow::Ok(())
        })
    }
}

/// Continuation appending `"next"` to the context log
pub fn next(ctx: &mut Ctx) -> BoxFuture<'_, anyhow::Result<()>> {
    Box::pin(async move {
        ctx.log.push("next".to_string());
        Ok(())
    })
}

/// Creates an empty file (and its parent directories) below `root`
pub fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "").unwrap();
}

/// Writes one file per module into a fresh directory and registers the modules
pub fn route_tree(modules: Vec<(&str, RouteModule<Ctx>)>) -> (TempDir, ModuleTable<Ctx>) {
    let dir = tempfile::tempdir().unwrap();
    let mut table = ModuleTable::new(dir.path());
    for (relative, module) in modules {
        touch(dir.path(), relative);
        table.insert(relative, module);
    }
    (dir, table)
}

/// Builds a resolver over `modules` with the default configuration
pub fn resolver(modules: Vec<(&str, RouteModule<Ctx>)>) -> (TempDir, Resolver<Ctx>) {
    let (dir, table) = route_tree(modules);
    let resolver = create_resolver(dir.path(), ResolverConfig::new(table)).unwrap();
    (dir, resolver)
}

pub fn try_resolver(
    dir: &TempDir,
    config: ResolverConfig<Ctx>,
) -> Result<Resolver<Ctx>, ResolveError> {
    create_resolver(dir.path(), config)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
