use chrono::Utc;
use tracing::{debug, info};

use commune_community::{derive_slug, Community, NewCommunity};
use commune_core::{CommunityId, Page, PageRequest, UserId};
use commune_infra::Filter;

use super::{index_by_id, AppServices};
use crate::app::dto::{CommunityListing, MemberListing, Reference};
use crate::app::errors::ApiError;

impl AppServices {
    pub async fn create_community(&self, owner: UserId, input: NewCommunity) -> Result<Community, ApiError> {
        input.validate()?;

        let slug = derive_slug(&input.name);
        if self.communities.find_one(&Filter::all().eq("slug", &slug)).await?.is_some() {
            return Err(ApiError::Conflict("Community slug already exists".into()));
        }

        let community = Community::create(&input, owner, Utc::now());
        self.communities.insert(&community).await?;
        info!(community_id = %community.id, owner = %owner, "community created");
        Ok(community)
    }

    /// Every community, owners populated.
    pub async fn list_communities(&self, request: PageRequest) -> Result<Page<CommunityListing>, ApiError> {
        let page = self.communities.find_page(&Filter::all(), request).await?;
        let owners = index_by_id(&self.users, page.data.iter().map(|c| c.owner)).await?;

        Ok(page.map(|community| {
            let owner = owners.get(&community.owner).map(Reference::user);
            CommunityListing::new(community, owner)
        }))
    }

    /// Communities owned by `owner`, owner left as a raw id.
    pub async fn list_owned_communities(
        &self,
        owner: UserId,
        request: PageRequest,
    ) -> Result<Page<Community>, ApiError> {
        Ok(self
            .communities
            .find_page(&Filter::all().eq("owner", owner), request)
            .await?)
    }

    /// Communities `user` is a member of, in the community listing shape.
    ///
    /// Paging counts membership rows; rows whose community is gone are
    /// dropped from `data` but still counted.
    pub async fn list_joined_communities(
        &self,
        user: UserId,
        request: PageRequest,
    ) -> Result<Page<CommunityListing>, ApiError> {
        let memberships = self.members.find_page(&Filter::all().eq("user", user), request).await?;

        let communities = index_by_id(&self.communities, memberships.data.iter().map(|m| m.community))
            .await?;
        let owners = index_by_id(&self.users, communities.values().map(|c| c.owner)).await?;

        let data = memberships
            .data
            .iter()
            .filter_map(|membership| {
                let Some(community) = communities.get(&membership.community).cloned() else {
                    debug!(member_id = %membership.id, community_id = %membership.community, "skipping membership of missing community");
                    return None;
                };
                let owner = owners.get(&community.owner).map(Reference::user);
                Some(CommunityListing::new(community, owner))
            })
            .collect();

        Ok(Page::new(memberships.meta, data))
    }

    /// Members of one community, user and role populated.
    pub async fn list_community_members(
        &self,
        community_id: &str,
        request: PageRequest,
    ) -> Result<Page<MemberListing>, ApiError> {
        let community_id: CommunityId = community_id.parse()?;

        let page = self
            .members
            .find_page(&Filter::all().eq("community", community_id), request)
            .await?;
        let users = index_by_id(&self.users, page.data.iter().map(|m| m.user)).await?;
        let roles = index_by_id(&self.roles, page.data.iter().map(|m| m.role)).await?;

        Ok(page.map(|member| {
            let user = users.get(&member.user).map(Reference::user);
            let role = roles.get(&member.role).map(Reference::role);
            if user.is_none() || role.is_none() {
                debug!(member_id = %member.id, "member has a dangling user or role");
            }
            MemberListing::new(member, user, role)
        }))
    }
}
