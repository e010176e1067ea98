//! Style splicing and customization-region clearing.
//!
//! [`apply_style`] is a pure function of its inputs. It parses a
//! private element tree, splices the selected style's model-state
//! branches into every `models` subtree, blanks customization leaves
//! whose region is not allowed, and serializes the result. Catalog
//! state is never touched, so concurrent calls need no synchronization.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::document::{DocumentError, Element};
use crate::game_constants::{MODEL_STATES, Region};

/// Structural errors mean the catalog and the document have drifted out
/// of sync; they abort the transform rather than producing a package
/// the game would reject.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("models subtree has no sets container")]
    MissingSets,
    #[error("style {0:?} not present under sets")]
    MissingStyle(String),
    #[error("style {style:?} lacks the {state:?} state branch")]
    MissingState { style: String, state: &'static str },
    #[error("unknown customization area code {0:?}")]
    UnknownAreaCode(String),
}

/// Produce a copy of `document` with `style_id`'s geometry spliced into
/// the base model-state slots and disallowed overlay regions blanked.
///
/// A style id that is not discoverable in the document is a benign
/// no-op: the input text comes back byte-identical. An unselected or
/// invalid style must never corrupt output.
pub fn apply_style(
    document: &str,
    style_id: &str,
    allowed_camo: &BTreeSet<Region>,
    allowed_paint: &BTreeSet<Region>,
) -> Result<String, TransformError> {
    let mut root = Element::parse(document)?;

    if !document_styles(&root).iter().any(|s| s == style_id) {
        return Ok(document.to_string());
    }

    splice_models(&mut root, style_id)?;
    clear_regions(&mut root, allowed_camo, allowed_paint)?;
    Ok(root.to_xml()?)
}

/// Style ids discoverable in a document: the direct children of every
/// `models`/`sets` branch.
pub fn document_styles(root: &Element) -> Vec<String> {
    let mut styles = Vec::new();
    collect_styles(root, &mut styles);
    styles
}

fn collect_styles(element: &Element, styles: &mut Vec<String>) {
    if element.tag == "models"
        && let Some(sets) = element.find_child("sets")
    {
        styles.extend(sets.children.iter().map(|s| s.tag.clone()));
    }
    for child in &element.children {
        collect_styles(child, styles);
    }
}

fn splice_models(element: &mut Element, style_id: &str) -> Result<(), TransformError> {
    if element.tag == "models" {
        splice_one(element, style_id)?;
    }
    for child in &mut element.children {
        splice_models(child, style_id)?;
    }
    Ok(())
}

fn splice_one(models: &mut Element, style_id: &str) -> Result<(), TransformError> {
    // Pull the replacement branches out of the style before the base
    // tree is modified, so a structurally broken style leaves the
    // subtree untouched.
    let sets = models.find_child("sets").ok_or(TransformError::MissingSets)?;
    let style = sets
        .find_child(style_id)
        .ok_or_else(|| TransformError::MissingStyle(style_id.to_string()))?;

    let mut replacements = Vec::with_capacity(MODEL_STATES.len());
    for state in MODEL_STATES {
        let branch = style
            .find_child(state)
            .ok_or_else(|| TransformError::MissingState {
                style: style_id.to_string(),
                state,
            })?;
        replacements.push(branch.clone());
    }

    // Substitute at the ordinal position of the first existing state
    // branch, in canonical undamaged/destroyed/exploded order.
    let first = models
        .children
        .iter()
        .position(|c| MODEL_STATES.contains(&c.tag.as_str()))
        .unwrap_or(0);
    models
        .children
        .retain(|c| !MODEL_STATES.contains(&c.tag.as_str()));
    let at = first.min(models.children.len());
    models.children.splice(at..at, replacements);
    Ok(())
}

fn clear_regions(
    element: &mut Element,
    allowed_camo: &BTreeSet<Region>,
    allowed_paint: &BTreeSet<Region>,
) -> Result<(), TransformError> {
    if element.tag == "customizableVehicleAreas" {
        clear_leaf(element, "camouflage", allowed_camo)?;
        clear_leaf(element, "paint", allowed_paint)?;
    }
    for child in &mut element.children {
        clear_regions(child, allowed_camo, allowed_paint)?;
    }
    Ok(())
}

fn clear_leaf(
    areas: &mut Element,
    tag: &str,
    allowed: &BTreeSet<Region>,
) -> Result<(), TransformError> {
    let Some(leaf) = areas.find_child_mut(tag) else {
        return Ok(());
    };
    let code = leaf.text.trim();
    if code.is_empty() {
        return Ok(());
    }
    let region = Region::from_area_code(code)
        .ok_or_else(|| TransformError::UnknownAreaCode(code.to_string()))?;
    if !allowed.contains(&region) {
        // The leaf stays in place; only its content is blanked.
        leaf.text.clear();
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const WINTER_DOC: &str = r#"<Ch01_Type59.xml>
  <chassis>
    <models>
      <undamaged><segment>base_undamaged</segment></undamaged>
      <destroyed><segment>base_destroyed</segment></destroyed>
      <exploded><segment>base_exploded</segment></exploded>
      <sets>
        <winter_camo>
          <undamaged><segment>winter_undamaged</segment></undamaged>
          <destroyed><segment>winter_destroyed</segment></destroyed>
          <exploded><segment>winter_exploded</segment></exploded>
        </winter_camo>
      </sets>
    </models>
    <customizableVehicleAreas>
      <camouflage>GUN</camouflage>
      <paint>HULL</paint>
    </customizableVehicleAreas>
  </chassis>
</Ch01_Type59.xml>"#;

    fn camo(regions: &[Region]) -> BTreeSet<Region> {
        regions.iter().copied().collect()
    }

    fn models_of(document: &str) -> Element {
        let root = Element::parse(document).unwrap();
        root.find_child("chassis")
            .unwrap()
            .find_child("models")
            .unwrap()
            .clone()
    }

    #[test]
    fn splices_style_states_and_clears_disallowed_regions() {
        let out = apply_style(
            WINTER_DOC,
            "winter_camo",
            &camo(&[Region::Chassis]),
            &camo(&[Region::Hull]),
        )
        .unwrap();

        let models = models_of(&out);
        let state_tags: Vec<&str> = models.children[..3].iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(state_tags, ["undamaged", "destroyed", "exploded"]);
        assert_eq!(
            models.children[0].find_child("segment").unwrap().text,
            "winter_undamaged"
        );
        assert_eq!(
            models.children[1].find_child("segment").unwrap().text,
            "winter_destroyed"
        );
        assert_eq!(
            models.children[2].find_child("segment").unwrap().text,
            "winter_exploded"
        );
        // The sets container survives the splice.
        assert!(models.find_child("sets").is_some());

        let root = Element::parse(&out).unwrap();
        let areas = root
            .find_child("chassis")
            .unwrap()
            .find_child("customizableVehicleAreas")
            .unwrap();
        assert_eq!(areas.find_child("camouflage").unwrap().text, "");
        assert_eq!(areas.find_child("paint").unwrap().text, "HULL");
    }

    #[test]
    fn unknown_style_is_a_byte_identical_no_op() {
        let out = apply_style(
            WINTER_DOC,
            "desert_camo",
            &camo(&[Region::Gun]),
            &camo(&[]),
        )
        .unwrap();
        assert_eq!(out, WINTER_DOC);
    }

    #[test]
    fn splice_is_deterministic() {
        let allowed = camo(&[Region::Gun, Region::Hull]);
        let once = apply_style(WINTER_DOC, "winter_camo", &allowed, &allowed).unwrap();
        let twice = apply_style(&once, "winter_camo", &allowed, &allowed).unwrap();

        // Re-applying to the already-transformed document must yield the
        // same state branches as a single application from the original.
        let first = models_of(&once);
        let second = models_of(&twice);
        assert_eq!(first.children[..3], second.children[..3]);
    }

    #[test]
    fn allowed_leaf_text_is_untouched() {
        let doc = "<T.xml><models><undamaged/><destroyed/><exploded/><sets><s><undamaged/><destroyed/><exploded/></s></sets></models><customizableVehicleAreas><camouflage>\n  GUN\n</camouflage></customizableVehicleAreas></T.xml>";
        let out = apply_style(doc, "s", &camo(&[Region::Gun]), &camo(&[])).unwrap();
        let root = Element::parse(&out).unwrap();
        let leaf = root
            .find_child("customizableVehicleAreas")
            .unwrap()
            .find_child("camouflage")
            .unwrap();
        assert_eq!(leaf.text, "\n  GUN\n");
    }

    #[test]
    fn missing_sets_container_is_fatal() {
        // The second models subtree claims no styles at all while the
        // first one makes "s" discoverable -- catalog/document drift.
        let doc = "<T.xml>\
            <turret><models><undamaged/><destroyed/><exploded/><sets><s><undamaged/><destroyed/><exploded/></s></sets></models></turret>\
            <gun><models><undamaged/><destroyed/><exploded/></models></gun>\
            </T.xml>";
        let err = apply_style(doc, "s", &camo(&[]), &camo(&[])).unwrap_err();
        assert!(matches!(err, TransformError::MissingSets));
    }

    #[test]
    fn missing_style_branch_is_fatal() {
        let doc = "<T.xml>\
            <turret><models><undamaged/><destroyed/><exploded/><sets><s><undamaged/><destroyed/><exploded/></s></sets></models></turret>\
            <gun><models><undamaged/><destroyed/><exploded/><sets><other><undamaged/><destroyed/><exploded/></other></sets></models></gun>\
            </T.xml>";
        let err = apply_style(doc, "s", &camo(&[]), &camo(&[])).unwrap_err();
        assert!(matches!(err, TransformError::MissingStyle(style) if style == "s"));
    }

    #[test]
    fn style_missing_a_state_branch_is_fatal() {
        let doc = "<T.xml><models><undamaged/><destroyed/><exploded/>\
            <sets><s><undamaged/><destroyed/></s></sets></models></T.xml>";
        let err = apply_style(doc, "s", &camo(&[]), &camo(&[])).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingState { state: "exploded", .. }
        ));
    }

    #[test]
    fn unknown_area_code_is_fatal() {
        let doc = "<T.xml><models><undamaged/><destroyed/><exploded/><sets><s><undamaged/><destroyed/><exploded/></s></sets></models>\
            <customizableVehicleAreas><camouflage>TRACKS</camouflage></customizableVehicleAreas></T.xml>";
        let err = apply_style(doc, "s", &camo(&[]), &camo(&[])).unwrap_err();
        assert!(matches!(err, TransformError::UnknownAreaCode(code) if code == "TRACKS"));
    }
}
