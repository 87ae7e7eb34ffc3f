use chrono::Utc;
use tracing::{debug, info};

use commune_auth::{authorize_member_assignment, authorize_member_removal, MembershipStanding, COMMUNITY_MODERATOR};
use commune_community::{Member, NewMember};
use commune_core::{CommunityId, MemberId, UserId};
use commune_infra::Filter;

use super::AppServices;
use crate::app::errors::ApiError;

const MEMBER_NOT_FOUND: &str = "Member not found";

impl AppServices {
    /// Add a user to a community. Only the community's owner may do this.
    pub async fn add_member(&self, caller: UserId, input: NewMember) -> Result<Member, ApiError> {
        let assignment = input.validate()?;

        let standing = MembershipStanding {
            is_owner: self.owns_community(caller, assignment.community).await?,
            is_moderator: false,
        };
        authorize_member_assignment(standing)?;

        // The role is not required to exist.
        if self.roles.find_one(&Filter::by_id(assignment.role)).await?.is_none() {
            debug!(role_id = %assignment.role, "adding member with unknown role");
        }

        let member = Member::create(assignment, Utc::now());
        self.members.insert(&member).await?;
        info!(
            member_id = %member.id,
            community_id = %member.community,
            user_id = %member.user,
            "member added"
        );
        Ok(member)
    }

    /// Remove a membership. Allowed for the community's owner and for its
    /// moderators.
    pub async fn remove_member(&self, caller: UserId, member_id: &str) -> Result<(), ApiError> {
        let member_id: MemberId = member_id
            .parse()
            .map_err(|_| ApiError::not_found(MEMBER_NOT_FOUND))?;

        let member = self
            .members
            .find_one(&Filter::by_id(member_id))
            .await?
            .ok_or_else(|| ApiError::not_found(MEMBER_NOT_FOUND))?;

        let is_owner = self.owns_community(caller, member.community).await?;
        let is_moderator = !is_owner && self.moderates_community(caller, member.community).await?;
        authorize_member_removal(MembershipStanding { is_owner, is_moderator })?;

        self.members.delete_one(&Filter::by_id(member.id)).await?;
        info!(member_id = %member.id, removed_by = %caller, "member removed");
        Ok(())
    }

    async fn owns_community(&self, user: UserId, community: CommunityId) -> Result<bool, ApiError> {
        let filter = Filter::by_id(community).eq("owner", user);
        Ok(self.communities.find_one(&filter).await?.is_some())
    }

    /// `user` holds the moderator role in `community`.
    async fn moderates_community(&self, user: UserId, community: CommunityId) -> Result<bool, ApiError> {
        let Some(moderator) = self
            .roles
            .find_one(&Filter::all().eq("name", COMMUNITY_MODERATOR))
            .await?
        else {
            return Ok(false);
        };

        let filter = Filter::all()
            .eq("user", user)
            .eq("role", moderator.id)
            .eq("community", community);
        Ok(self.members.find_one(&filter).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::test_support::{services, STRONG_PASSWORD};
    use crate::app::services::AppServices;
    use commune_community::{Community, NewCommunity, NewRole, Registration, Role};
    use commune_core::{PageRequest, RoleId};

    async fn user(services: &AppServices, name: &str) -> UserId {
        services
            .register(Registration {
                name: Some(name.to_string()),
                email: format!("{}@example.com", name.to_lowercase()),
                password: STRONG_PASSWORD.to_string(),
            })
            .await
            .unwrap()
            .profile
            .id
    }

    async fn role(services: &AppServices, name: &str) -> Role {
        services
            .create_role(NewRole { name: name.to_string() })
            .await
            .unwrap()
    }

    async fn community(services: &AppServices, owner: UserId, name: &str) -> Community {
        services
            .create_community(owner, NewCommunity { name: name.to_string() })
            .await
            .unwrap()
    }

    fn assignment(community: &Community, user: UserId, role: RoleId) -> NewMember {
        NewMember {
            community: community.id.to_string(),
            user: user.to_string(),
            role: role.to_string(),
        }
    }

    /// Alice owns Foo; Bob moderates it; Carol and Dave are plain members.
    struct Fixture {
        services: AppServices,
        bob: UserId,
        carol: UserId,
        alice: UserId,
        carol_membership: Member,
        dave_membership: Member,
    }

    async fn fixture() -> Fixture {
        let services = services();
        let alice = user(&services, "Alice").await;
        let bob = user(&services, "Bob").await;
        let carol = user(&services, "Carol").await;
        let dave = user(&services, "Dave").await;
        let foo = community(&services, alice, "Foo").await;
        let moderator = role(&services, COMMUNITY_MODERATOR).await;
        let plain = role(&services, "Community Member").await;

        services.add_member(alice, assignment(&foo, bob, moderator.id)).await.unwrap();
        let carol_membership = services.add_member(alice, assignment(&foo, carol, plain.id)).await.unwrap();
        let dave_membership = services.add_member(alice, assignment(&foo, dave, plain.id)).await.unwrap();

        Fixture {
            services,
            bob,
            carol,
            alice,
            carol_membership,
            dave_membership,
        }
    }

    #[tokio::test]
    async fn only_the_owner_adds_members() {
        let f = fixture().await;
        let foo = f
            .services
            .list_owned_communities(f.alice, PageRequest::default())
            .await
            .unwrap()
            .data
            .remove(0);

        let err = f
            .services
            .add_member(f.bob, assignment(&foo, f.carol, RoleId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == "Not Allowed Access"));
    }

    #[tokio::test]
    async fn adding_to_a_missing_community_is_forbidden() {
        let services = services();
        let alice = user(&services, "Alice").await;
        let input = NewMember {
            community: CommunityId::new().to_string(),
            user: alice.to_string(),
            role: RoleId::new().to_string(),
        };
        let err = services.add_member(alice, input).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let services = services();
        let alice = user(&services, "Alice").await;
        let err = services.add_member(alice, NewMember::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn plain_member_cannot_remove_others() {
        let f = fixture().await;
        let err = f
            .services
            .remove_member(f.carol, &f.dave_membership.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(ref m) if m == "Not Allowed Access"));
    }

    #[tokio::test]
    async fn moderator_can_remove_any_member() {
        let f = fixture().await;
        f.services
            .remove_member(f.bob, &f.dave_membership.id.to_string())
            .await
            .unwrap();
        f.services
            .remove_member(f.bob, &f.carol_membership.id.to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn owner_can_remove_members() {
        let f = fixture().await;
        f.services
            .remove_member(f.alice, &f.carol_membership.id.to_string())
            .await
            .unwrap();

        let err = f
            .services
            .remove_member(f.alice, &f.carol_membership.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == MEMBER_NOT_FOUND));
    }

    #[tokio::test]
    async fn moderator_of_another_community_is_forbidden() {
        let f = fixture().await;
        let erin = user(&f.services, "Erin").await;
        let bar = community(&f.services, erin, "Bar").await;
        let plain = role(&f.services, "Bar Member").await;
        let erin_membership = f
            .services
            .add_member(erin, assignment(&bar, erin, plain.id))
            .await
            .unwrap();

        let err = f
            .services
            .remove_member(f.bob, &erin_membership.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn malformed_member_id_is_not_found() {
        let f = fixture().await;
        let err = f.services.remove_member(f.alice, "garbage").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
