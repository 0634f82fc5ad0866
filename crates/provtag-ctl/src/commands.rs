use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;

use provtag_core::{admission::Admission, router::ProvisionerRouter, tags::CanonicalTags};
use provtag_model::{JobRequest, ProvisionerRequest, TagMap, TagSources, UserId};
use provtag_prometheus::{Encoder, PrometheusMetrics, TextEncoder};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DescriptorKind {
    /// Job submission (template, job and caller layers)
    #[default]
    Job,
    /// Provisioner registration (advertised tags)
    Provisioner,
}

#[derive(Args, Debug, Default)]
pub struct NormalizeArgs {
    /// What the tags describe
    #[arg(long, value_enum, default_value_t = DescriptorKind::Job)]
    pub kind: DescriptorKind,

    /// Read a JobRequest / ProvisionerRequest JSON document instead of flags
    #[arg(long, conflicts_with_all = ["user", "template", "job_tag", "tag"])]
    pub file: Option<PathBuf>,

    /// Authenticated identity of the submitter or provisioner
    #[arg(long)]
    pub user: Option<UserId>,

    /// Template default tag (key=value), lowest precedence
    #[arg(long = "template", value_name = "KEY=VALUE")]
    pub template: Vec<String>,

    /// Job override tag (key=value)
    #[arg(long = "job-tag", value_name = "KEY=VALUE")]
    pub job_tag: Vec<String>,

    /// Caller tag (key=value), highest precedence; advertised tag for provisioners
    #[arg(long = "tag", short = 't', value_name = "KEY=VALUE")]
    pub tag: Vec<String>,
}

#[derive(Args, Debug)]
pub struct RouteArgs {
    /// JobRequest JSON document
    #[arg(long)]
    pub job: PathBuf,

    /// JSON array of ProvisionerRequest documents, in snapshot order
    #[arg(long)]
    pub provisioners: PathBuf,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Descriptor JSON object as persisted by the queue or registry
    #[arg(long)]
    pub file: PathBuf,
}

pub fn normalize(admission: &Admission, args: &NormalizeArgs) -> Result<Value> {
    let tags = match (&args.file, args.kind) {
        (Some(path), DescriptorKind::Job) => admission.admit_job(&load_json::<JobRequest>(path)?),
        (Some(path), DescriptorKind::Provisioner) => {
            admission.admit_provisioner(&load_json::<ProvisionerRequest>(path)?)
        }
        (None, DescriptorKind::Job) => admission.admit_job(&job_from_flags(args)?),
        (None, DescriptorKind::Provisioner) => {
            admission.admit_provisioner(&provisioner_from_flags(args)?)
        }
    };
    Ok(describe(&tags))
}

pub fn route(admission: &Admission, args: &RouteArgs) -> Result<Value> {
    let job = load_json::<JobRequest>(&args.job)?;
    let provisioners = load_json::<Vec<ProvisionerRequest>>(&args.provisioners)?;
    route_requests(admission, &job, &provisioners)
}

pub fn validate(args: &ValidateArgs) -> Result<Value> {
    let raw = load_json::<TagMap>(&args.file)?;
    let tags = CanonicalTags::from_persisted(raw)
        .with_context(|| format!("{} is not a canonical descriptor", args.file.display()))?;
    Ok(describe(&tags))
}

pub fn render_metrics(metrics: &PrometheusMetrics) -> Result<String> {
    let mut buf = Vec::new();
    TextEncoder::new().encode(&metrics.gather(), &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

fn route_requests(
    admission: &Admission,
    job: &JobRequest,
    provisioners: &[ProvisionerRequest],
) -> Result<Value> {
    let mut router = ProvisionerRouter::new().with_metrics(admission.metrics().clone());
    for req in provisioners {
        router.register_request(req)?;
    }

    let descriptor = admission.admit_job(job);
    let ranked = router.route(&descriptor);
    info!(job = %job.job_id, candidates = ranked.len(), pool = router.len(), "routing finished");

    let candidates: Vec<Value> = ranked
        .iter()
        .map(|c| {
            json!({
                "name": c.worker.name,
                "specificity": c.specificity,
                "tags": c.worker.tags,
            })
        })
        .collect();

    Ok(json!({
        "jobId": job.job_id,
        "job": descriptor,
        "preferred": ranked.first().map(|c| c.worker.name.clone()),
        "candidates": candidates,
    }))
}

fn job_from_flags(args: &NormalizeArgs) -> Result<JobRequest> {
    let sources = TagSources::new()
        .with_template(TagMap::parse_pairs(&args.template)?)
        .with_job(TagMap::parse_pairs(&args.job_tag)?)
        .with_caller(TagMap::parse_pairs(&args.tag)?);

    let mut req = JobRequest::new("cli").with_sources(sources);
    req.initiator = args.user;
    Ok(req)
}

fn provisioner_from_flags(args: &NormalizeArgs) -> Result<ProvisionerRequest> {
    if !args.template.is_empty() || !args.job_tag.is_empty() {
        bail!("--template and --job-tag only apply to --kind job");
    }
    let mut req = ProvisionerRequest::new("cli", TagMap::parse_pairs(&args.tag)?);
    req.registered_by = args.user;
    Ok(req)
}

fn describe(tags: &CanonicalTags) -> Value {
    json!({
        "scope": tags.scope(),
        "owner": tags.owner(),
        "tags": tags,
    })
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use provtag_model::{SCOPE_USER, TAG_SCOPE};

    fn flags(user: Option<UserId>, tag: &[&str]) -> NormalizeArgs {
        NormalizeArgs {
            user,
            tag: tag.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn normalize_from_flags_binds_user() {
        let me = UserId::new_v4();
        let out = normalize(&Admission::new(), &flags(Some(me), &["scope=user", "region=us"])).unwrap();

        assert_eq!(out["scope"], "user");
        assert_eq!(out["owner"], me.to_string());
        assert_eq!(out["tags"]["region"], "us");
    }

    #[test]
    fn normalize_rejects_malformed_flags() {
        let res = normalize(&Admission::new(), &flags(None, &["region"]));
        assert!(res.is_err());
    }

    #[test]
    fn provisioner_kind_refuses_job_layers() {
        let args = NormalizeArgs {
            kind: DescriptorKind::Provisioner,
            template: vec!["region=us".into()],
            ..Default::default()
        };
        assert!(normalize(&Admission::new(), &args).is_err());
    }

    #[test]
    fn route_requests_lists_ranked_candidates() {
        let me = UserId::new_v4();
        let personal = TagMap::new().with(TAG_SCOPE, SCOPE_USER);
        let provisioners = vec![
            ProvisionerRequest::new("shared-gpu", TagMap::new().with("gpu", "a100")),
            ProvisionerRequest::new("shared", TagMap::new()),
            ProvisionerRequest::new("mine", personal).with_registered_by(me),
        ];

        let org_job = JobRequest::new("j1");
        let out = route_requests(&Admission::new(), &org_job, &provisioners).unwrap();
        assert_eq!(out["preferred"], "shared");
        assert_eq!(out["candidates"].as_array().unwrap().len(), 2);
        assert_eq!(out["candidates"][1]["specificity"], 1);

        let user_job = JobRequest::new("j2")
            .with_initiator(me)
            .with_caller_tag(TAG_SCOPE, SCOPE_USER);
        let out = route_requests(&Admission::new(), &user_job, &provisioners).unwrap();
        assert_eq!(out["preferred"], "mine");
        assert_eq!(out["candidates"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn route_requests_fails_on_duplicate_names() {
        let provisioners = vec![
            ProvisionerRequest::new("p", TagMap::new()),
            ProvisionerRequest::new("p", TagMap::new()),
        ];
        assert!(route_requests(&Admission::new(), &JobRequest::new("j"), &provisioners).is_err());
    }

    #[test]
    fn metrics_render_after_admission() {
        let metrics = PrometheusMetrics::new().unwrap();
        let admission = Admission::new().with_metrics(std::sync::Arc::new(metrics.clone()));
        normalize(&admission, &flags(None, &["scope=bogus"])).unwrap();

        let text = render_metrics(&metrics).unwrap();
        assert!(text.contains(r#"resolution="invalid_scope""#));
    }
}
