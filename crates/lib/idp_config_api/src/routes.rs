//! Route paths.

pub const GET_HEALTH: &str = "/health";
pub const CONFIGURATIONS: &str = "/configurations";
pub const POST_CONFIGURATIONS_VALIDATE: &str = "/configurations/validate";
pub const POST_CONFIGURATIONS_PREVIEW: &str = "/configurations/preview";
pub const GET_CONFIGURATIONS_NAMESPACE: &str = "/configurations/{namespace}";
pub const CONFIGURATIONS_NAMESPACE_NAME: &str = "/configurations/{namespace}/{name}";
pub const ENVIRONMENT: &str = "/configurations/{namespace}/{name}/environments/{env}";
pub const GET_ENVIRONMENT_HISTORY: &str =
    "/configurations/{namespace}/{name}/environments/{env}/history";
pub const GET_ENVIRONMENT_PREVIEW: &str =
    "/configurations/{namespace}/{name}/environments/{env}/preview";
pub const GET_ENVIRONMENT_DIFF: &str = "/configurations/{namespace}/{name}/environments/{env}/diff";
pub const POST_ENVIRONMENT_ROLLBACK: &str =
    "/configurations/{namespace}/{name}/environments/{env}/rollback";
pub const POST_PROMOTE: &str = "/configurations/{namespace}/{name}/promote";
pub const POST_PROMOTE_PREVIEW: &str = "/configurations/{namespace}/{name}/promote/preview";
pub const GET_COMPARE: &str = "/configurations/{namespace}/{name}/compare";
pub const GET_TEMPLATES: &str = "/templates";
pub const POST_TEMPLATE_APPLY: &str = "/templates/{template}/apply";
