//! Short badge labels for Kubernetes documentation links.

/// Ordered label rules: the first rule whose substrings all occur in the
/// lower-cased URL wins.
const LABEL_RULES: &[(&[&str], &str)] = &[
    (&["kubelet-config"], "kubelet-config"),
    (&["kubelet", "command-line"], "kubelet-cli"),
    (&["kubelet", "config-file"], "kubelet-file"),
    (&["kube-apiserver"], "kube-api"),
    (&["apiserver", "authorization"], "api-auth"),
    (&["noderestriction"], "node-restriction"),
    (&["imagepolicywebhook"], "image-webhook"),
    (&["admission-controllers"], "admission"),
    (&["admissionconfiguration"], "admission-config"),
    (&["security-context"], "security-context"),
    (&["pod-security-standards"], "pod-security"),
    (&["pod-security-admission"], "psa"),
    (&["network-policies"], "network-policy"),
    (&["network-policy"], "netpol"),
    (&["kubeadm", "upgrade"], "kubeadm-upgrade"),
    (&["drain"], "drain-node"),
    (&["service-account"], "serviceaccount"),
    (&["serviceaccount"], "sa"),
    (&["projected"], "projected-vol"),
    (&["secret"], "secrets"),
    (&["volume"], "volumes"),
    (&["runtime-class"], "runtime"),
    (&["container-runtimes"], "runtimes"),
    (&["audit"], "audit"),
    (&["etcd"], "etcd"),
    (&["rbac"], "rbac"),
    (&["deployment"], "deployment"),
];

/// Path segments that say nothing about the page.
const SKIPPED_SEGMENTS: &[&str] = &["docs", "reference", "tasks", "concepts"];

const FALLBACK_MAX_CHARS: usize = 20;

/// Badge label for a documentation URL.
///
/// Falls back to the last meaningful path segment, without `.html`, cut to
/// 20 characters.
pub fn doc_label(url: &str) -> String {
    let lower = url.to_lowercase();
    let matched = LABEL_RULES
        .iter()
        .find(|(needles, _)| needles.iter().all(|n| lower.contains(n)));
    if let Some((_, label)) = matched {
        return label.to_string();
    }

    let last = url
        .split('/')
        .filter(|part| !part.is_empty() && !SKIPPED_SEGMENTS.contains(part))
        .last()
        .unwrap_or("");
    let stem = last.strip_suffix(".html").unwrap_or(last);
    stem.chars().take(FALLBACK_MAX_CHARS).collect()
}
