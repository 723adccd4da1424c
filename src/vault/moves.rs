//! Move and move-tag operations.

use super::{resolve, same_name, Vault};
use crate::core::{normalize_name, now, Move, MoveTag, MoveTagLink, MoveWithTags, TagWithMoves};
use crate::error::{Result, VaultError};

impl Vault {
    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn move_by_id(&self, id: &str) -> Option<&Move> {
        self.moves.iter().find(|m| m.id == id)
    }

    pub fn move_tag_by_id(&self, id: &str) -> Option<&MoveTag> {
        self.move_tags.iter().find(|t| t.id == id)
    }

    /// Look a move up by id or name.
    pub fn resolve_move(&self, key: &str) -> Result<&Move> {
        resolve(&self.moves, "move", key, |m| &m.id, |m| &m.name)
    }

    /// Look a tag up by id or name.
    pub fn resolve_move_tag(&self, key: &str) -> Result<&MoveTag> {
        resolve(&self.move_tags, "tag", key, |t| &t.id, |t| &t.name)
    }

    /// All raw moves in insertion order.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// All raw cross-reference rows.
    pub fn move_tag_links(&self) -> &[MoveTagLink] {
        &self.move_tag_links
    }

    /// All tags ordered by name.
    pub fn move_tags(&self) -> Vec<MoveTag> {
        let mut tags = self.move_tags.clone();
        tags.sort_by_key(|t| t.name.to_lowercase());
        tags
    }

    /// Tags of one move, ordered by name.
    pub fn tags_for_move(&self, move_id: &str) -> Vec<MoveTag> {
        let mut tags: Vec<MoveTag> = self
            .move_tag_links
            .iter()
            .filter(|l| l.move_id == move_id)
            .filter_map(|l| self.move_tag_by_id(&l.tag_id).cloned())
            .collect();
        tags.sort_by_key(|t| t.name.to_lowercase());
        tags
    }

    /// Moves carrying one tag, in insertion order.
    pub fn moves_for_tag(&self, tag_id: &str) -> Vec<Move> {
        self.moves
            .iter()
            .filter(|m| {
                self.move_tag_links
                    .iter()
                    .any(|l| l.move_id == m.id && l.tag_id == tag_id)
            })
            .cloned()
            .collect()
    }

    pub fn move_with_tags(&self, move_id: &str) -> Option<MoveWithTags> {
        self.move_by_id(move_id).map(|mv| MoveWithTags {
            mv: mv.clone(),
            tags: self.tags_for_move(move_id),
        })
    }

    /// Every move with its tags, ordered by move name.
    pub fn moves_with_tags(&self) -> Vec<MoveWithTags> {
        let mut all: Vec<MoveWithTags> = self
            .moves
            .iter()
            .map(|mv| MoveWithTags {
                mv: mv.clone(),
                tags: self.tags_for_move(&mv.id),
            })
            .collect();
        all.sort_by_key(|m| m.mv.name.to_lowercase());
        all
    }

    pub fn tag_with_moves(&self, tag_id: &str) -> Option<TagWithMoves> {
        self.move_tag_by_id(tag_id).map(|tag| TagWithMoves {
            tag: tag.clone(),
            moves: self.moves_for_tag(tag_id),
        })
    }

    /// Every tag with its moves, ordered by tag name.
    pub fn tags_with_moves(&self) -> Vec<TagWithMoves> {
        self.move_tags()
            .into_iter()
            .map(|tag| {
                let moves = self.moves_for_tag(&tag.id);
                TagWithMoves { tag, moves }
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Moves
    // -------------------------------------------------------------------------

    /// Create a move and link it to the given tags.
    pub fn add_move(&mut self, name: &str, tag_ids: &[String]) -> Result<Move> {
        let name = normalize_name("move name", name)?;
        self.check_tags_exist(tag_ids)?;

        let mv = Move::new(name);
        self.moves.push(mv.clone());
        for tag_id in tag_ids {
            self.push_link(&mv.id, tag_id);
        }

        tracing::debug!(move_id = %mv.id, name = %mv.name, tags = tag_ids.len(), "added move");
        Ok(mv)
    }

    /// Insert a fully built move. Fails if the id is already taken.
    pub fn insert_move(&mut self, mv: Move) -> Result<()> {
        if self.move_by_id(&mv.id).is_some() {
            return Err(VaultError::constraint(format!(
                "move id '{}' already exists",
                mv.id
            )));
        }
        self.moves.push(mv);
        Ok(())
    }

    /// Rename a move and/or replace all of its tags.
    pub fn update_move(
        &mut self,
        move_id: &str,
        new_name: Option<&str>,
        new_tag_ids: Option<&[String]>,
    ) -> Result<Move> {
        let name = new_name
            .map(|n| normalize_name("move name", n))
            .transpose()?;
        if let Some(tag_ids) = new_tag_ids {
            self.check_tags_exist(tag_ids)?;
        }

        let mv = self
            .moves
            .iter_mut()
            .find(|m| m.id == move_id)
            .ok_or_else(|| VaultError::not_found("move", move_id))?;

        if let Some(name) = name {
            mv.name = name;
            mv.modified_at = now();
        }
        let updated = mv.clone();

        if let Some(tag_ids) = new_tag_ids {
            self.unlink_move_from_all_tags(move_id);
            for tag_id in tag_ids {
                self.push_link(move_id, tag_id);
            }
        }

        tracing::debug!(move_id = %move_id, "updated move");
        Ok(updated)
    }

    /// Delete a move and every link pointing at it.
    ///
    /// Saved combos keep the move's name.
    pub fn delete_move(&mut self, move_id: &str) -> Result<Move> {
        let index = self
            .moves
            .iter()
            .position(|m| m.id == move_id)
            .ok_or_else(|| VaultError::not_found("move", move_id))?;

        let unlinked = self.unlink_move_from_all_tags(move_id);
        let removed = self.moves.remove(index);

        tracing::debug!(move_id = %move_id, unlinked, "deleted move");
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Tags
    // -------------------------------------------------------------------------

    /// Create a tag. Names are unique ignoring case.
    pub fn add_move_tag(&mut self, name: &str) -> Result<MoveTag> {
        let name = normalize_name("tag name", name)?;
        self.check_tag_name_free(&name, None)?;

        let tag = MoveTag::new(name);
        self.move_tags.push(tag.clone());

        tracing::debug!(tag_id = %tag.id, name = %tag.name, "added move tag");
        Ok(tag)
    }

    /// Insert a fully built tag. Fails on a taken id or name.
    pub fn insert_move_tag(&mut self, tag: MoveTag) -> Result<()> {
        if self.move_tag_by_id(&tag.id).is_some() {
            return Err(VaultError::constraint(format!(
                "tag id '{}' already exists",
                tag.id
            )));
        }
        self.check_tag_name_free(&tag.name, None)?;
        self.move_tags.push(tag);
        Ok(())
    }

    pub fn rename_move_tag(&mut self, tag_id: &str, new_name: &str) -> Result<MoveTag> {
        let name = normalize_name("tag name", new_name)?;
        if self.move_tag_by_id(tag_id).is_none() {
            return Err(VaultError::not_found("tag", tag_id));
        }
        self.check_tag_name_free(&name, Some(tag_id))?;

        let tag = self
            .move_tags
            .iter_mut()
            .find(|t| t.id == tag_id)
            .ok_or_else(|| VaultError::not_found("tag", tag_id))?;
        tag.name = name;
        tag.modified_at = now();

        Ok(tag.clone())
    }

    /// Unlink a tag from every move, then delete it. Moves survive.
    pub fn delete_move_tag(&mut self, tag_id: &str) -> Result<MoveTag> {
        let index = self
            .move_tags
            .iter()
            .position(|t| t.id == tag_id)
            .ok_or_else(|| VaultError::not_found("tag", tag_id))?;

        let before = self.move_tag_links.len();
        self.move_tag_links.retain(|l| l.tag_id != tag_id);
        let unlinked = before - self.move_tag_links.len();
        let removed = self.move_tags.remove(index);

        tracing::debug!(tag_id = %tag_id, unlinked, "deleted move tag");
        Ok(removed)
    }

    // -------------------------------------------------------------------------
    // Cross-references
    // -------------------------------------------------------------------------

    /// Link a move to a tag. Both must exist; linking twice is a no-op.
    pub fn link(&mut self, move_id: &str, tag_id: &str) -> Result<()> {
        if self.move_by_id(move_id).is_none() {
            return Err(VaultError::constraint(format!(
                "cannot link: move '{}' does not exist",
                move_id
            )));
        }
        if self.move_tag_by_id(tag_id).is_none() {
            return Err(VaultError::constraint(format!(
                "cannot link: tag '{}' does not exist",
                tag_id
            )));
        }
        self.push_link(move_id, tag_id);
        Ok(())
    }

    /// Remove every link of a move. Returns how many were removed.
    pub fn unlink_move_from_all_tags(&mut self, move_id: &str) -> usize {
        let before = self.move_tag_links.len();
        self.move_tag_links.retain(|l| l.move_id != move_id);
        before - self.move_tag_links.len()
    }

    fn push_link(&mut self, move_id: &str, tag_id: &str) {
        let link = MoveTagLink::new(move_id, tag_id);
        if !self.move_tag_links.contains(&link) {
            self.move_tag_links.push(link);
        }
    }

    fn check_tags_exist(&self, tag_ids: &[String]) -> Result<()> {
        for tag_id in tag_ids {
            if self.move_tag_by_id(tag_id).is_none() {
                return Err(VaultError::constraint(format!(
                    "tag '{}' does not exist",
                    tag_id
                )));
            }
        }
        Ok(())
    }

    fn check_tag_name_free(&self, name: &str, except_id: Option<&str>) -> Result<()> {
        let taken = self
            .move_tags
            .iter()
            .any(|t| same_name(&t.name, name) && Some(t.id.as_str()) != except_id);
        if taken {
            return Err(VaultError::constraint(format!(
                "a tag named '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}
