use travel_manager_api::Role;

/// Actions a session may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SubmitRequest,
    ViewOwnRequests,
    ViewAllRequests,
    ReviewRequests,
    ViewBudget,
    ManageBudget,
    ManageFaculty,
}

const PROFESSOR: &[Capability] = &[Capability::SubmitRequest, Capability::ViewOwnRequests];

const ACCOUNTANT: &[Capability] = &[
    Capability::ViewAllRequests,
    Capability::ViewBudget,
    Capability::ManageBudget,
];

const APPROVAL: &[Capability] = &[
    Capability::ViewAllRequests,
    Capability::ReviewRequests,
    Capability::ViewBudget,
];

const ADMIN: &[Capability] = &[
    Capability::SubmitRequest,
    Capability::ViewOwnRequests,
    Capability::ViewAllRequests,
    Capability::ReviewRequests,
    Capability::ViewBudget,
    Capability::ManageBudget,
    Capability::ManageFaculty,
];

pub fn capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Professor => PROFESSOR,
        Role::Accountant => ACCOUNTANT,
        Role::Approval => APPROVAL,
        Role::Admin => ADMIN,
    }
}

pub fn has_capability(role: Role, capability: Capability) -> bool {
    capabilities(role).contains(&capability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn professor_can_submit_but_not_review() {
        assert!(has_capability(Role::Professor, Capability::SubmitRequest));
        assert!(!has_capability(Role::Professor, Capability::ReviewRequests));
        assert!(!has_capability(Role::Professor, Capability::ViewBudget));
    }

    #[test]
    fn only_accountant_and_admin_manage_budget() {
        assert!(has_capability(Role::Accountant, Capability::ManageBudget));
        assert!(has_capability(Role::Admin, Capability::ManageBudget));
        assert!(!has_capability(Role::Approval, Capability::ManageBudget));
        assert!(!has_capability(Role::Professor, Capability::ManageBudget));
    }

    #[test]
    fn approval_role_reviews_requests() {
        assert!(has_capability(Role::Approval, Capability::ReviewRequests));
        assert!(!has_capability(Role::Accountant, Capability::ReviewRequests));
    }

    #[test]
    fn only_admin_manages_faculty() {
        for role in [Role::Professor, Role::Accountant, Role::Approval] {
            assert!(!has_capability(role, Capability::ManageFaculty));
        }
        assert!(has_capability(Role::Admin, Capability::ManageFaculty));
    }
}
