/**
 * Contact Workflow
 *
 * The contact-request state machine per ordered pair (requester, target):
 *
 * ```text
 * none ──send──▶ requested ──accept──▶ accepted (mutual contacts + conversation)
 *                    │
 *                 decline
 *                    ▼
 *                  none
 * ```
 *
 * While a request is pending, the requester appears in the target's
 * `contactRequests` exactly when the target appears in the requester's
 * `sentRequests`. Both sides of every transition are written through one
 * transactional pair update, so the two documents cannot drift apart.
 *
 * Accepting also ensures a conversation exists for the pair. The
 * lookup-then-create runs after the pair update commits and is not itself
 * transactional: two acceptances racing between the same pair can in
 * principle both miss the lookup and create duplicate conversations. A
 * sequential retry never duplicates.
 */

use std::sync::Arc;

use crate::domain::{Conversation, UserRecord};
use crate::error::ApiError;
use crate::store::{ConversationStore, CredentialStore};

/// Result of ensuring a conversation exists for a pair.
#[derive(Debug, Clone)]
pub enum EnsureOutcome {
    /// A new conversation was created for the pair.
    Created(Conversation),
    /// The pair already had a conversation.
    Existing(Conversation),
}

impl EnsureOutcome {
    pub fn conversation(&self) -> &Conversation {
        match self {
            Self::Created(convo) | Self::Existing(convo) => convo,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

#[derive(Clone)]
pub struct ContactWorkflow {
    creds: Arc<dyn CredentialStore>,
    conversations: Arc<dyn ConversationStore>,
}

impl ContactWorkflow {
    pub fn new(
        creds: Arc<dyn CredentialStore>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        Self { creds, conversations }
    }

    /// Send a contact request from `requester` to `target`.
    ///
    /// # Errors
    ///
    /// * `BadRequest` - requester and target are the same user
    /// * `NotFound` - either user document does not exist
    /// * `Conflict` - the request is already pending
    pub async fn send_request(&self, requester: &str, target: &str) -> Result<(), ApiError> {
        if requester == target {
            return Err(ApiError::bad_request(
                "cannot send a contact request to yourself",
            ));
        }

        let requester_name = requester.to_string();
        let target_name = target.to_string();

        self.creds
            .update_pair(
                requester,
                target,
                Box::new(move |requester_doc, target_doc| {
                    let target_doc = target_doc.as_mut().ok_or_else(|| {
                        ApiError::not_found(format!("user '{}' not found", target_name))
                    })?;
                    let requester_doc = requester_doc.as_mut().ok_or_else(|| {
                        ApiError::not_found(format!("user '{}' not found", requester_name))
                    })?;

                    if target_doc.contact_requests.contains(&requester_name) {
                        return Err(ApiError::conflict("contact request already pending"));
                    }

                    target_doc.contact_requests.insert(requester_name.clone());
                    requester_doc.sent_requests.insert(target_name.clone());
                    Ok(())
                }),
            )
            .await?;

        tracing::info!("Contact request sent: {} -> {}", requester, target);
        Ok(())
    }

    /// Accept a pending request from `contact`, establishing a mutual
    /// contact relationship and ensuring the pair's conversation exists.
    ///
    /// A missing user document (either side) is treated as an empty profile
    /// and created on the fly; this endpoint alone keeps that lenient
    /// behavior. Accepting does not require a pending request to exist.
    pub async fn accept_request(
        &self,
        user: &str,
        contact: &str,
    ) -> Result<EnsureOutcome, ApiError> {
        if user == contact {
            return Err(ApiError::bad_request("cannot accept yourself as a contact"));
        }

        let user_name = user.to_string();
        let contact_name = contact.to_string();

        self.creds
            .update_pair(
                user,
                contact,
                Box::new(move |user_doc, contact_doc| {
                    let user_doc = user_doc.get_or_insert_with(UserRecord::default);
                    let contact_doc = contact_doc.get_or_insert_with(UserRecord::default);

                    user_doc.contacts.insert(contact_name.clone());
                    contact_doc.contacts.insert(user_name.clone());

                    user_doc.contact_requests.remove(&contact_name);
                    contact_doc.sent_requests.remove(&user_name);
                    Ok(())
                }),
            )
            .await?;

        let outcome = self.ensure_conversation(user, contact).await?;
        tracing::info!(
            "Contact request accepted: {} <-> {} (conversation {})",
            user,
            contact,
            outcome.conversation().id
        );
        Ok(outcome)
    }

    /// Decline a pending request from `contact`.
    ///
    /// # Errors
    ///
    /// * `NotFound` - no pending request from `contact`
    pub async fn decline_request(&self, user: &str, contact: &str) -> Result<(), ApiError> {
        if user == contact {
            return Err(ApiError::bad_request("cannot decline yourself"));
        }

        let user_name = user.to_string();
        let contact_name = contact.to_string();

        self.creds
            .update_pair(
                user,
                contact,
                Box::new(move |user_doc, contact_doc| {
                    let user_doc = user_doc.as_mut().ok_or_else(|| {
                        ApiError::not_found("no pending contact request")
                    })?;

                    if !user_doc.contact_requests.remove(&contact_name) {
                        return Err(ApiError::not_found(format!(
                            "no pending contact request from '{}'",
                            contact_name
                        )));
                    }
                    if let Some(contact_doc) = contact_doc.as_mut() {
                        contact_doc.sent_requests.remove(&user_name);
                    }
                    Ok(())
                }),
            )
            .await?;

        tracing::info!("Contact request declined: {} x {}", user, contact);
        Ok(())
    }

    /// Find the conversation for an unordered pair, creating it if absent.
    pub async fn ensure_conversation(&self, a: &str, b: &str) -> Result<EnsureOutcome, ApiError> {
        if let Some(existing) = self.conversations.find_by_participants(a, b).await? {
            return Ok(EnsureOutcome::Existing(existing));
        }

        // Known limitation: two concurrent first acceptances can both miss
        // the lookup above and create two conversations for the pair.
        let convo = Conversation::between(a, b);
        self.conversations.create(&convo).await?;
        Ok(EnsureOutcome::Created(convo))
    }

    /// Contacts of `user`, sorted. Fails `NotFound` for unknown users.
    pub async fn contacts_of(&self, user: &str) -> Result<Vec<String>, ApiError> {
        Ok(self.load(user).await?.contacts.into_iter().collect())
    }

    /// Incoming pending requests for `user`, sorted.
    pub async fn pending_requests_of(&self, user: &str) -> Result<Vec<String>, ApiError> {
        Ok(self.load(user).await?.contact_requests.into_iter().collect())
    }

    /// Outgoing pending requests of `user`, sorted.
    pub async fn sent_requests_of(&self, user: &str) -> Result<Vec<String>, ApiError> {
        Ok(self.load(user).await?.sent_requests.into_iter().collect())
    }

    async fn load(&self, user: &str) -> Result<UserRecord, ApiError> {
        self.creds
            .get(user)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("user '{}' not found", user)))
    }
}
