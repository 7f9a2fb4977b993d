//! Organization scoping.
//!
//! **Rule**: every read, and every lookup of a write target, goes through [`scope`].
//! A record outside the scope is reported as not found, never as forbidden.
//!
//! Each resource kind declares how its rows reach an organization ([`Reachability`]).
//! The policy itself is written once and rendered two ways: as an SQL predicate for
//! queries, and as an in-memory check for payloads that are about to be written.

use sqlx::{QueryBuilder, Sqlite};

use crate::app::domain::Principal;

/// One way a row can reach an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgPath {
    /// Organization id held in a column of the row.
    Column(&'static str),
    /// Foreign key to a row of `table` whose `organization_id` is the link.
    Parent {
        fk: &'static str,
        table: &'static str,
    },
    /// Join table of `(fk, organization_id)` pairs keyed by the row id.
    Membership {
        table: &'static str,
        fk: &'static str,
    },
    /// An organization row reaches itself and all of its ancestors.
    Lineage,
}

/// Everything that can admit a row for a principal with an organization.
/// Paths are a union: one matching path is enough.
#[derive(Debug, Clone, Copy)]
pub struct Reachability {
    pub paths: &'static [OrgPath],
    /// Boolean column that admits the row regardless of organization.
    pub public_flag: Option<&'static str>,
    /// Column holding the creator; admits the row for its creator.
    pub owner: Option<&'static str>,
}

/// Resource kinds under organization scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Aggregate,
    Event,
    Participant,
    SocialService,
    Referral,
    Report,
    Organization,
    Respondent,
    Interaction,
    Project,
}

const VIA_RESPONDENT: OrgPath = OrgPath::Parent {
    fk: "respondent_id",
    table: "respondents",
};

impl ResourceKind {
    pub const fn reachability(self) -> Reachability {
        match self {
            ResourceKind::Aggregate | ResourceKind::Event | ResourceKind::Respondent => Reachability {
                paths: &[OrgPath::Column("organization_id")],
                public_flag: None,
                owner: None,
            },
            ResourceKind::Participant => Reachability {
                paths: &[OrgPath::Parent {
                    fk: "event_id",
                    table: "events",
                }],
                public_flag: None,
                owner: None,
            },
            ResourceKind::SocialService | ResourceKind::Interaction => Reachability {
                paths: &[VIA_RESPONDENT],
                public_flag: None,
                owner: None,
            },
            ResourceKind::Referral => Reachability {
                paths: &[
                    OrgPath::Column("from_organization_id"),
                    OrgPath::Column("to_organization_id"),
                ],
                public_flag: None,
                owner: None,
            },
            ResourceKind::Report => Reachability {
                paths: &[OrgPath::Column("organization_id")],
                public_flag: Some("is_public"),
                owner: Some("created_by"),
            },
            ResourceKind::Organization => Reachability {
                paths: &[OrgPath::Lineage],
                public_flag: None,
                owner: None,
            },
            ResourceKind::Project => Reachability {
                paths: &[OrgPath::Membership {
                    table: "project_organizations",
                    fk: "project_id",
                }],
                public_flag: None,
                owner: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Access {
    All,
    Organization(String),
    Nothing,
}

/// The subset of one resource kind a principal may see.
#[derive(Debug, Clone)]
pub struct Scope {
    kind: ResourceKind,
    access: Access,
    principal_id: String,
}

/// Materialised reachability of a single resource, used to check payloads before they are written.
#[derive(Debug, Clone, Default)]
pub struct ResourceFacts {
    /// Organizations the resource reaches through any of its paths. `admits` only compares
    /// members of this list, so for [`OrgPath::Lineage`] it must hold the organization and
    /// every one of its ancestors.
    pub organizations: Vec<String>,
    pub is_public: bool,
    pub created_by: Option<String>,
}

impl ResourceFacts {
    pub fn reaching<I, S>(organizations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            organizations: organizations.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Build the scope of `kind` for `principal`. Depends only on the principal's role and organization.
pub fn scope(principal: &Principal, kind: ResourceKind) -> Scope {
    let access = if principal.is_admin() {
        Access::All
    } else if let Some(org) = &principal.organization_id {
        Access::Organization(org.clone())
    } else {
        Access::Nothing
    };

    Scope {
        kind,
        access,
        principal_id: principal.user_id.clone(),
    }
}

impl Scope {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// True when the scope admits every row.
    pub fn is_unrestricted(&self) -> bool {
        self.access == Access::All
    }

    /// True when the scope admits no row at all.
    pub fn is_empty(&self) -> bool {
        self.access == Access::Nothing
    }

    /// The organization the scope is anchored to, if any.
    pub fn organization(&self) -> Option<&str> {
        match &self.access {
            Access::Organization(org) => Some(org),
            _ => None,
        }
    }

    /// Evaluate the predicate against one resource's reachability.
    /// No path is resolved here; `facts` must already list every organization the resource reaches.
    pub fn admits(&self, facts: &ResourceFacts) -> bool {
        match &self.access {
            Access::All => true,
            Access::Nothing => false,
            Access::Organization(org) => {
                let reach = self.kind.reachability();
                facts.organizations.iter().any(|o| o == org)
                    || (reach.public_flag.is_some() && facts.is_public)
                    || (reach.owner.is_some()
                        && facts.created_by.as_deref() == Some(self.principal_id.as_str()))
            }
        }
    }

    /// Push the predicate as a parenthesised SQL boolean expression over rows aliased `alias`.
    pub fn push_predicate(&self, qb: &mut QueryBuilder<'_, Sqlite>, alias: &str) {
        let org = match &self.access {
            Access::All => {
                qb.push("1 = 1");
                return;
            }
            Access::Nothing => {
                qb.push("0 = 1");
                return;
            }
            Access::Organization(org) => org,
        };

        let reach = self.kind.reachability();
        qb.push("(");
        let mut first = true;
        for path in reach.paths {
            separate(qb, &mut first);
            push_path(qb, alias, *path, org);
        }
        if let Some(flag) = reach.public_flag {
            separate(qb, &mut first);
            qb.push(format!("{alias}.{flag} = 1"));
        }
        if let Some(owner) = reach.owner {
            separate(qb, &mut first);
            qb.push(format!("{alias}.{owner} = "));
            qb.push_bind(self.principal_id.clone());
        }
        qb.push(")");
    }
}

fn separate(qb: &mut QueryBuilder<'_, Sqlite>, first: &mut bool) {
    if !*first {
        qb.push(" OR ");
    }
    *first = false;
}

fn push_path(qb: &mut QueryBuilder<'_, Sqlite>, alias: &str, path: OrgPath, org: &str) {
    match path {
        OrgPath::Column(column) => {
            qb.push(format!("{alias}.{column} = "));
        }
        OrgPath::Parent { fk, table } => {
            qb.push(format!(
                "{alias}.{fk} IN (SELECT id FROM {table} WHERE organization_id = "
            ));
        }
        OrgPath::Membership { table, fk } => {
            qb.push(format!(
                "{alias}.id IN (SELECT {fk} FROM {table} WHERE organization_id = "
            ));
        }
        OrgPath::Lineage => {
            qb.push(format!(
                "{alias}.id IN (WITH RECURSIVE subtree(id) AS (SELECT "
            ));
        }
    }
    qb.push_bind(org.to_string());
    match path {
        OrgPath::Column(_) => {}
        OrgPath::Parent { .. } | OrgPath::Membership { .. } => {
            qb.push(")");
        }
        OrgPath::Lineage => {
            qb.push(
                " UNION SELECT o.id FROM organizations o JOIN subtree s ON o.parent_id = s.id) SELECT id FROM subtree)",
            );
        }
    }
}
