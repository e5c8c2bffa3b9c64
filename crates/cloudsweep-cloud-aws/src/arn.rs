//! Minimal ARN parsing for the cluster-teardown dispatch

/// Resource type and id extracted from an ARN
///
/// `arn:aws:ec2:us-east-1:123456789012:volume/vol-0abc` parses to
/// `("ec2", "volume", "vol-0abc")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArnParts<'a> {
    pub service: &'a str,
    pub resource_type: &'a str,
    pub resource_id: &'a str,
}

pub fn parse(arn: &str) -> Option<ArnParts<'_>> {
    let mut fields = arn.splitn(6, ':');
    if fields.next()? != "arn" {
        return None;
    }
    let _partition = fields.next()?;
    let service = fields.next()?;
    let _region = fields.next()?;
    let _account = fields.next()?;
    let resource = fields.next()?;

    // Resource is either "type/id" or "type:id"; a bare id has no type.
    let (resource_type, resource_id) = resource
        .split_once('/')
        .or_else(|| resource.split_once(':'))
        .unwrap_or(("", resource));
    Some(ArnParts {
        service,
        resource_type,
        resource_id,
    })
}
