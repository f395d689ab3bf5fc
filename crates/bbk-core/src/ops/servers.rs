//! Server inventory CRUD

use super::report;
use crate::home::files;
use crate::io::store::DocumentStore;
use crate::schema::Server;
use std::path::Path;

/// Add or update a server, keyed by name.
pub fn add_server(store: &DocumentStore, root: &Path, server: Server) -> bool {
    let path = root.join(files::SERVERS);
    let result = store.read_modify_write_json(&path, Vec::new(), |mut servers: Vec<Server>| {
        match servers
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(&server.name))
        {
            Some(existing) => *existing = server.clone(),
            None => servers.push(server.clone()),
        }
        servers
    });
    report("add_server", &path, result)
}

/// Remove a server by name. Succeeds even when no record matched.
pub fn remove_server(store: &DocumentStore, root: &Path, name: &str) -> bool {
    let path = root.join(files::SERVERS);
    let result = store.read_modify_write_json(&path, Vec::new(), |mut servers: Vec<Server>| {
        servers.retain(|s| !s.name.eq_ignore_ascii_case(name));
        servers
    });
    report("remove_server", &path, result)
}

/// Staleness-tolerant listing for views.
pub fn list_servers(store: &DocumentStore, root: &Path) -> Vec<Server> {
    store
        .read_json(&root.join(files::SERVERS), Vec::new())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "server listing failed");
            Vec::new()
        })
}
