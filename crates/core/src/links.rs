//! Navigation paths for involved objects.

#![forbid(unsafe_code)]

use crate::ObjectRef;

/// Maps an object reference to a navigation path; returns an empty string when the
/// object cannot be linked.
pub trait LinkResolver: Send + Sync {
    fn resolve(&self, obj: &ObjectRef) -> String;
}

// (kind, section, plural, namespaced)
const ROUTES: &[(&str, &str, &str, bool)] = &[
    // Workloads
    ("CronJob", "workloads", "cronjobs", true),
    ("DaemonSet", "workloads", "daemonsets", true),
    ("Deployment", "workloads", "deployments", true),
    ("Job", "workloads", "jobs", true),
    ("Pod", "workloads", "pods", true),
    ("ReplicaSet", "workloads", "replicasets", true),
    ("ReplicationController", "workloads", "replicationcontrollers", true),
    ("StatefulSet", "workloads", "statefulsets", true),
    // Discovery & load balancing
    ("Endpoints", "discovery-and-loadbalancing", "endpoints", true),
    ("HorizontalPodAutoscaler", "discovery-and-loadbalancing", "horizontalpodautoscalers", true),
    ("Ingress", "discovery-and-loadbalancing", "ingresses", true),
    ("NetworkPolicy", "discovery-and-loadbalancing", "networkpolicies", true),
    ("Service", "discovery-and-loadbalancing", "services", true),
    // Config & storage
    ("ConfigMap", "config-and-storage", "configmaps", true),
    ("PersistentVolumeClaim", "config-and-storage", "persistentvolumeclaims", true),
    ("PersistentVolume", "config-and-storage", "persistentvolumes", false),
    ("PodDisruptionBudget", "config-and-storage", "poddisruptionbudgets", true),
    ("Secret", "config-and-storage", "secrets", true),
    ("ServiceAccount", "config-and-storage", "serviceaccounts", true),
    ("StorageClass", "config-and-storage", "storageclasses", false),
    // RBAC
    ("ClusterRole", "rbac", "clusterroles", false),
    ("ClusterRoleBinding", "rbac", "clusterrolebindings", false),
    ("Role", "rbac", "roles", true),
    ("RoleBinding", "rbac", "rolebindings", true),
    // Cluster
    ("Namespace", "cluster", "namespaces", false),
    ("Node", "cluster", "nodes", false),
];

/// Default resolver producing `/resources/<section>/<plural>[/<namespace>]/<name>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteLinks;

impl LinkResolver for RouteLinks {
    fn resolve(&self, obj: &ObjectRef) -> String {
        let Some(kind) = obj.kind.as_deref() else { return String::new(); };
        let Some((_, section, plural, namespaced)) = ROUTES.iter().find(|(k, ..)| *k == kind) else {
            return String::new();
        };
        let name = match obj.name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => return String::new(),
        };
        if *namespaced {
            match obj.namespace.as_deref() {
                Some(ns) if !ns.is_empty() => format!("/resources/{}/{}/{}/{}", section, plural, ns, name),
                _ => String::new(),
            }
        } else {
            format!("/resources/{}/{}/{}", section, plural, name)
        }
    }
}
