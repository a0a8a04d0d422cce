//! Resource descriptors
//!
//! Each resource kind is its own validated struct; [`ResourceDescriptor`] is the
//! closed union over all of them. Construction validates every caller-supplied
//! segment, so derived artifact ids can always be split back on
//! [`ARTIFACT_DELIMITER`](crate::identity::ARTIFACT_DELIMITER) unambiguously.
//!
//! ```text
//! Shared__DELIM__Movie                         collection
//! Shared__DELIM__Movie:ws-alice:search-app     application
//! agent-7                                      agent
//! agent-7:ws-alice                             workspace agent
//! agent-7:ws-alice:run-42                      run
//! ```

use crate::artifact::{ArtifactConfig, CreateArtifactRequest, Manifest};
use crate::config::AdminWorkspaces;
use crate::errors::WardenResult;
use crate::grants::{PermissionMap, EVERYONE};
use crate::identity::{full_collection_name, join_segments, validate_identifier};
use crate::operation::Operation;
use crate::settings::CollectionSettings;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Caller-supplied parameters used when a resource's artifact is created
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreationParams {
    /// Workspace that receives `*` in addition to any intrinsic owner
    pub owner: Option<String>,
    /// Manifest description; a generic one is used when absent
    pub description: Option<String>,
    /// Extra manifest metadata
    pub metadata: Map<String, Value>,
    /// Grant for `"*"`; the resource's declared default when absent
    pub default_grant: Option<Operation>,
}

impl CreationParams {
    /// Parameters owned by a workspace
    pub fn owned_by(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the metadata
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Override the `"*"` grant
    pub fn with_default_grant(mut self, grant: Operation) -> Self {
        self.default_grant = Some(grant);
        self
    }
}

/// Behaviour shared by every resource kind
pub trait Resource {
    /// Short kind label used in logs and default descriptions
    fn kind(&self) -> &'static str;

    /// Artifact id backing this resource
    fn artifact_id(&self) -> String;

    /// Artifact id of the immediately enclosing resource
    fn parent_artifact_id(&self) -> Option<String>;

    /// Descriptor of the immediately enclosing resource
    fn parent(&self) -> Option<ResourceDescriptor>;

    /// Human-readable description used in errors
    fn description(&self) -> String;

    /// Grant applied to `"*"` when the caller does not choose one
    fn declared_default(&self) -> Operation;

    /// Whether a missing parent artifact may be recreated during creation
    fn self_heals_parent(&self) -> bool {
        false
    }

    /// Workspace the resource belongs to by construction
    fn intrinsic_owner(&self) -> Option<&str> {
        None
    }

    /// `(collection, workspace)` when the resource introduces a tenant scope
    fn tenant_scope(&self) -> Option<(&str, &str)> {
        None
    }

    /// Metadata derived from the identity, merged over caller metadata
    fn identity_metadata(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Parameters used when the resource is created without caller input
    fn creation_params(&self) -> CreationParams {
        CreationParams {
            owner: self.intrinsic_owner().map(str::to_string),
            ..CreationParams::default()
        }
    }

    /// Manifest written at creation
    fn default_manifest(&self, params: &CreationParams) -> Manifest {
        let artifact_id = self.artifact_id();
        let mut metadata = params.metadata.clone();
        metadata.extend(self.identity_metadata());
        Manifest {
            description: params
                .description
                .clone()
                .unwrap_or_else(|| format!("{} artifact {artifact_id}", self.kind())),
            name: artifact_id,
            collection: Vec::new(),
            metadata,
        }
    }

    /// Permission map written at creation: `"*"` gets the default grant, the
    /// owners and every admin workspace get `*`
    fn default_permissions(&self, params: &CreationParams, admins: &AdminWorkspaces) -> PermissionMap {
        let everyone = params.default_grant.unwrap_or_else(|| self.declared_default());
        let mut map = BTreeMap::new();
        map.insert(EVERYONE.to_string(), everyone.as_str().to_string());
        let owners = self
            .intrinsic_owner()
            .into_iter()
            .chain(params.owner.as_deref())
            .chain(admins.iter());
        for owner in owners {
            map.insert(owner.to_string(), Operation::All.as_str().to_string());
        }
        PermissionMap::from(map)
    }

    /// Full store request for creating this resource's artifact
    fn creation_request(
        &self,
        params: &CreationParams,
        admins: &AdminWorkspaces,
        artifact_type: &str,
    ) -> CreateArtifactRequest {
        CreateArtifactRequest {
            alias: self.artifact_id(),
            artifact_type: artifact_type.to_string(),
            parent_id: self.parent_artifact_id(),
            manifest: self.default_manifest(params),
            config: ArtifactConfig::with_permissions(self.default_permissions(params, admins)),
        }
    }
}

/// A shared vector collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionResource {
    name: String,
    full_name: String,
}

impl CollectionResource {
    /// Validate a caller-facing collection name
    pub fn new(name: impl Into<String>) -> WardenResult<Self> {
        let name = name.into();
        let full_name = full_collection_name(&name)?;
        Ok(Self { name, full_name })
    }

    /// Caller-facing name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Storage name inside the shared namespace
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Creation parameters derived from the collection's settings.
    ///
    /// Used both for the first creation and for rebuilding a deleted artifact,
    /// so the two always yield the same manifest.
    pub fn params_from_settings(settings: &CollectionSettings) -> CreationParams {
        let mut metadata = Map::new();
        metadata.insert("settings".to_string(), settings.with_short_name().to_value());
        CreationParams {
            owner: None,
            description: settings.description().map(str::to_string),
            metadata,
            default_grant: None,
        }
    }
}

impl Resource for CollectionResource {
    fn kind(&self) -> &'static str {
        "collection"
    }

    fn artifact_id(&self) -> String {
        self.full_name.clone()
    }

    fn parent_artifact_id(&self) -> Option<String> {
        None
    }

    fn parent(&self) -> Option<ResourceDescriptor> {
        None
    }

    fn description(&self) -> String {
        format!("collection '{}'", self.name)
    }

    fn declared_default(&self) -> Operation {
        Operation::NoAccess
    }
}

/// An application inside a collection, owned by one workspace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApplicationResource {
    collection: CollectionResource,
    application_id: String,
    owner_workspace: String,
}

impl ApplicationResource {
    /// Validate an application descriptor
    pub fn new(
        collection: impl Into<String>,
        application_id: impl Into<String>,
        owner_workspace: impl Into<String>,
    ) -> WardenResult<Self> {
        let collection = CollectionResource::new(collection)?;
        let application_id = application_id.into();
        let owner_workspace = owner_workspace.into();
        validate_identifier("Application id", &application_id)?;
        validate_identifier("Workspace", &owner_workspace)?;
        Ok(Self {
            collection,
            application_id,
            owner_workspace,
        })
    }

    /// Enclosing collection
    pub fn collection(&self) -> &CollectionResource {
        &self.collection
    }

    /// Application id
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Workspace owning the application (and its tenant)
    pub fn owner_workspace(&self) -> &str {
        &self.owner_workspace
    }
}

impl Resource for ApplicationResource {
    fn kind(&self) -> &'static str {
        "application"
    }

    fn artifact_id(&self) -> String {
        join_segments(&[
            self.collection.full_name(),
            &self.owner_workspace,
            &self.application_id,
        ])
    }

    fn parent_artifact_id(&self) -> Option<String> {
        Some(self.collection.artifact_id())
    }

    fn parent(&self) -> Option<ResourceDescriptor> {
        Some(ResourceDescriptor::Collection(self.collection.clone()))
    }

    fn description(&self) -> String {
        format!(
            "application '{}' in collection '{}'",
            self.application_id,
            self.collection.name()
        )
    }

    fn declared_default(&self) -> Operation {
        Operation::NoAccess
    }

    fn self_heals_parent(&self) -> bool {
        true
    }

    fn intrinsic_owner(&self) -> Option<&str> {
        Some(&self.owner_workspace)
    }

    fn tenant_scope(&self) -> Option<(&str, &str)> {
        Some((self.collection.name(), &self.owner_workspace))
    }

    fn identity_metadata(&self) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert(
            "application_id".to_string(),
            Value::String(self.application_id.clone()),
        );
        metadata.insert(
            "short_collection_name".to_string(),
            Value::String(self.collection.name().to_string()),
        );
        metadata
    }
}

/// A bare agent, shared across workspaces
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentResource {
    agent_id: String,
}

impl AgentResource {
    /// Validate an agent id
    pub fn new(agent_id: impl Into<String>) -> WardenResult<Self> {
        let agent_id = agent_id.into();
        validate_identifier("Agent id", &agent_id)?;
        Ok(Self { agent_id })
    }

    /// Agent id
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// The agent scoped to one workspace
    pub fn in_workspace(&self, workspace: impl Into<String>) -> WardenResult<WorkspaceAgentResource> {
        WorkspaceAgentResource::new(self.agent_id.clone(), workspace)
    }
}

impl Resource for AgentResource {
    fn kind(&self) -> &'static str {
        "agent"
    }

    fn artifact_id(&self) -> String {
        self.agent_id.clone()
    }

    fn parent_artifact_id(&self) -> Option<String> {
        None
    }

    fn parent(&self) -> Option<ResourceDescriptor> {
        None
    }

    fn description(&self) -> String {
        format!("agent '{}'", self.agent_id)
    }

    fn declared_default(&self) -> Operation {
        Operation::Read
    }

    fn identity_metadata(&self) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("agent_id".to_string(), Value::String(self.agent_id.clone()));
        metadata
    }
}

/// An agent's memory space within one workspace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkspaceAgentResource {
    agent: AgentResource,
    workspace: String,
}

impl WorkspaceAgentResource {
    /// Validate a workspace-scoped agent
    pub fn new(agent_id: impl Into<String>, workspace: impl Into<String>) -> WardenResult<Self> {
        let agent = AgentResource::new(agent_id)?;
        let workspace = workspace.into();
        validate_identifier("Workspace", &workspace)?;
        Ok(Self { agent, workspace })
    }

    /// Enclosing bare agent
    pub fn agent(&self) -> &AgentResource {
        &self.agent
    }

    /// Workspace the agent is scoped to
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// A run under this workspace agent
    pub fn run(&self, run_id: impl Into<String>) -> WardenResult<RunResource> {
        RunResource::new(self.agent.agent_id(), self.workspace.clone(), run_id)
    }
}

impl Resource for WorkspaceAgentResource {
    fn kind(&self) -> &'static str {
        "workspace agent"
    }

    fn artifact_id(&self) -> String {
        join_segments(&[self.agent.agent_id(), &self.workspace])
    }

    fn parent_artifact_id(&self) -> Option<String> {
        Some(self.agent.artifact_id())
    }

    fn parent(&self) -> Option<ResourceDescriptor> {
        Some(ResourceDescriptor::Agent(self.agent.clone()))
    }

    fn description(&self) -> String {
        format!(
            "agent '{}' in workspace '{}'",
            self.agent.agent_id(),
            self.workspace
        )
    }

    fn declared_default(&self) -> Operation {
        Operation::NoAccess
    }

    fn intrinsic_owner(&self) -> Option<&str> {
        Some(&self.workspace)
    }

    fn identity_metadata(&self) -> Map<String, Value> {
        let mut metadata = self.agent.identity_metadata();
        metadata.insert("workspace".to_string(), Value::String(self.workspace.clone()));
        metadata
    }
}

/// One run of an agent within a workspace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunResource {
    scope: WorkspaceAgentResource,
    run_id: String,
}

impl RunResource {
    /// Validate a run descriptor
    pub fn new(
        agent_id: impl Into<String>,
        workspace: impl Into<String>,
        run_id: impl Into<String>,
    ) -> WardenResult<Self> {
        let scope = WorkspaceAgentResource::new(agent_id, workspace)?;
        let run_id = run_id.into();
        validate_identifier("Run id", &run_id)?;
        Ok(Self { scope, run_id })
    }

    /// Enclosing workspace agent
    pub fn workspace_agent(&self) -> &WorkspaceAgentResource {
        &self.scope
    }

    /// Run id
    pub fn run_id(&self) -> &str {
        &self.run_id
    }
}

impl Resource for RunResource {
    fn kind(&self) -> &'static str {
        "run"
    }

    fn artifact_id(&self) -> String {
        join_segments(&[
            self.scope.agent().agent_id(),
            self.scope.workspace(),
            &self.run_id,
        ])
    }

    fn parent_artifact_id(&self) -> Option<String> {
        Some(self.scope.artifact_id())
    }

    fn parent(&self) -> Option<ResourceDescriptor> {
        Some(ResourceDescriptor::WorkspaceAgent(self.scope.clone()))
    }

    fn description(&self) -> String {
        format!("{} with run '{}'", self.scope.description(), self.run_id)
    }

    fn declared_default(&self) -> Operation {
        Operation::NoAccess
    }

    fn self_heals_parent(&self) -> bool {
        true
    }

    fn intrinsic_owner(&self) -> Option<&str> {
        Some(self.scope.workspace())
    }

    fn identity_metadata(&self) -> Map<String, Value> {
        let mut metadata = self.scope.identity_metadata();
        metadata.insert("run_id".to_string(), Value::String(self.run_id.clone()));
        metadata
    }
}

/// Closed union of every resource kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceDescriptor {
    /// A shared collection
    Collection(CollectionResource),
    /// An application inside a collection
    Application(ApplicationResource),
    /// A bare agent
    Agent(AgentResource),
    /// An agent scoped to a workspace
    WorkspaceAgent(WorkspaceAgentResource),
    /// A run of a workspace agent
    Run(RunResource),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            ResourceDescriptor::Collection($inner) => $body,
            ResourceDescriptor::Application($inner) => $body,
            ResourceDescriptor::Agent($inner) => $body,
            ResourceDescriptor::WorkspaceAgent($inner) => $body,
            ResourceDescriptor::Run($inner) => $body,
        }
    };
}

impl ResourceDescriptor {
    /// Collection descriptor
    pub fn collection(name: impl Into<String>) -> WardenResult<Self> {
        CollectionResource::new(name).map(Self::Collection)
    }

    /// Application descriptor
    pub fn application(
        collection: impl Into<String>,
        application_id: impl Into<String>,
        owner_workspace: impl Into<String>,
    ) -> WardenResult<Self> {
        ApplicationResource::new(collection, application_id, owner_workspace).map(Self::Application)
    }

    /// Bare agent descriptor
    pub fn agent(agent_id: impl Into<String>) -> WardenResult<Self> {
        AgentResource::new(agent_id).map(Self::Agent)
    }

    /// Workspace agent descriptor
    pub fn workspace_agent(
        agent_id: impl Into<String>,
        workspace: impl Into<String>,
    ) -> WardenResult<Self> {
        WorkspaceAgentResource::new(agent_id, workspace).map(Self::WorkspaceAgent)
    }

    /// Run descriptor
    pub fn run(
        agent_id: impl Into<String>,
        workspace: impl Into<String>,
        run_id: impl Into<String>,
    ) -> WardenResult<Self> {
        RunResource::new(agent_id, workspace, run_id).map(Self::Run)
    }
}

impl Resource for ResourceDescriptor {
    fn kind(&self) -> &'static str {
        dispatch!(self, r => r.kind())
    }

    fn artifact_id(&self) -> String {
        dispatch!(self, r => r.artifact_id())
    }

    fn parent_artifact_id(&self) -> Option<String> {
        dispatch!(self, r => r.parent_artifact_id())
    }

    fn parent(&self) -> Option<ResourceDescriptor> {
        dispatch!(self, r => r.parent())
    }

    fn description(&self) -> String {
        dispatch!(self, r => r.description())
    }

    fn declared_default(&self) -> Operation {
        dispatch!(self, r => r.declared_default())
    }

    fn self_heals_parent(&self) -> bool {
        dispatch!(self, r => r.self_heals_parent())
    }

    fn intrinsic_owner(&self) -> Option<&str> {
        dispatch!(self, r => r.intrinsic_owner())
    }

    fn tenant_scope(&self) -> Option<(&str, &str)> {
        dispatch!(self, r => r.tenant_scope())
    }

    fn identity_metadata(&self) -> Map<String, Value> {
        dispatch!(self, r => r.identity_metadata())
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

impl From<CollectionResource> for ResourceDescriptor {
    fn from(r: CollectionResource) -> Self {
        Self::Collection(r)
    }
}

impl From<ApplicationResource> for ResourceDescriptor {
    fn from(r: ApplicationResource) -> Self {
        Self::Application(r)
    }
}

impl From<AgentResource> for ResourceDescriptor {
    fn from(r: AgentResource) -> Self {
        Self::Agent(r)
    }
}

impl From<WorkspaceAgentResource> for ResourceDescriptor {
    fn from(r: WorkspaceAgentResource) -> Self {
        Self::WorkspaceAgent(r)
    }
}

impl From<RunResource> for ResourceDescriptor {
    fn from(r: RunResource) -> Self {
        Self::Run(r)
    }
}
