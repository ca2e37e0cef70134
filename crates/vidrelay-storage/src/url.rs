//! Public URL composition rules

/// How a published key becomes a client-facing URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicUrl {
    /// CDN distribution in front of the bucket: `{base}/{key}`
    Distribution { base: String },
    /// Standard AWS virtual-hosted URL: `https://{bucket}.s3.{region}.amazonaws.com/{key}`
    VirtualHosted { bucket: String, region: String },
    /// S3-compatible provider, path style: `{endpoint}/{bucket}/{key}`
    PathStyle { endpoint: String, bucket: String },
    /// Files served by this process or a static host: `{base}/{key}`
    BaseUrl { base: String },
}

impl PublicUrl {
    /// Pick the rule for an S3 bucket. A distribution host wins, then a custom endpoint.
    pub fn for_bucket(
        bucket: &str,
        region: &str,
        endpoint: Option<&str>,
        distribution: Option<&str>,
    ) -> Self {
        if let Some(base) = distribution {
            PublicUrl::Distribution {
                base: base.to_string(),
            }
        } else if let Some(endpoint) = endpoint {
            PublicUrl::PathStyle {
                endpoint: endpoint.to_string(),
                bucket: bucket.to_string(),
            }
        } else {
            PublicUrl::VirtualHosted {
                bucket: bucket.to_string(),
                region: region.to_string(),
            }
        }
    }

    pub fn compose(&self, key: &str) -> String {
        let key = key.trim_start_matches('/');
        match self {
            PublicUrl::Distribution { base } | PublicUrl::BaseUrl { base } => {
                format!("{}/{}", base.trim_end_matches('/'), key)
            }
            PublicUrl::VirtualHosted { bucket, region } => {
                format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
            }
            PublicUrl::PathStyle { endpoint, bucket } => {
                format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
            }
        }
    }
}
