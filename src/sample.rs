//! Bundled sample story used when no story file is given.

use crate::error::MalformedData;
use crate::story::node::StoryNode;
use crate::story::tree::StoryTree;

// ---------------------------------------------------------------------------
// The Awakening
// ---------------------------------------------------------------------------

/// A small fantasy adventure: two regions, a few loops back to the
/// crossroads, and five endings that each unlock an achievement.
pub fn awakening() -> Result<StoryTree, MalformedData> {
    let nodes = vec![
        StoryNode::new(
            "start",
            "The Awakening\n\n\
             You wake beneath violet clouds with a rune-covered map at your feet. \
             One trail vanishes into a whispering forest; a cobbled road leads to a village.",
        )
        .with_mood("mysterious")
        .with_image_prompt("violet sky over a crossroads, glowing map, forest and village paths")
        .with_choice("Take the forest trail", "forest_entrance")
        .with_choice("Walk to the village", "village_gate"),
        StoryNode::new(
            "forest_entrance",
            "The Whispering Woods\n\n\
             Ancient oaks close in. A soft light drifts between the trunks, \
             and a hollow tree gapes like a doorway.",
        )
        .with_mood("magical")
        .with_image_prompt("enchanted forest, drifting lights, hollow tree trunk")
        .with_choice("Follow the light", "mystic_clearing")
        .with_choice("Enter the hollow trunk", "hollow_trunk")
        .with_choice("Return to the crossroads", "start"),
        StoryNode::new(
            "village_gate",
            "Ravenwood Gates\n\n\
             A merchant offers you a humming amulet while children stare at your glowing map.",
        )
        .with_mood("hopeful")
        .with_image_prompt("fantasy village gate, merchant holding an amulet")
        .with_choice("Buy the amulet", "amulet_shop")
        .with_choice("Ask about the map", "old_scholar")
        .with_choice("Return to the crossroads", "start"),
        StoryNode::new(
            "mystic_clearing",
            "The Stag's Clearing\n\n\
             A stag with crystal antlers asks: 'I speak without a mouth and hear without ears. \
             What am I?'",
        )
        .with_mood("wise")
        .with_image_prompt("crystal-antlered stag in a sunlit clearing")
        .with_choice("Answer 'an echo'", "riddle_success")
        .with_choice("Withdraw respectfully", "forest_exit"),
        StoryNode::new(
            "hollow_trunk",
            "Chamber of Whispers\n\n\
             Runes glow inside the trunk. An iron key rests on a mossy altar.",
        )
        .with_mood("mysterious")
        .with_image_prompt("hidden chamber inside a tree, runes, iron key on an altar")
        .with_choice("Take the key", "key_taken")
        .with_choice("Leave it and go back", "forest_entrance"),
        StoryNode::new(
            "amulet_shop",
            "Visions of the Amulet\n\n\
             The amulet warms and shows you a lighthouse on storm-beaten cliffs.",
        )
        .with_mood("visionary")
        .with_image_prompt("amulet projecting a vision of a lighthouse in a storm")
        .with_choice("Follow the vision", "lighthouse_path")
        .with_choice("Discard the amulet", "village_gate"),
        StoryNode::new(
            "old_scholar",
            "The Scholar's Discovery\n\n\
             An old scholar traces the runes. 'The Library of Whispers,' he breathes, \
             'hidden beneath the sea.'",
        )
        .with_mood("discovery")
        .with_image_prompt("old scholar examining an ancient map")
        .with_choice("Seek the hidden library", "undersea_library")
        .with_choice("Explore the market instead", "village_market"),
        StoryNode::new(
            "riddle_success",
            "The Stag's Blessing\n\n\
             The stag bows. A shimmering ward settles over you.",
        )
        .with_mood("triumphant")
        .with_image_prompt("stag bestowing a glowing ward on a traveller")
        .with_choice("Go deeper into the forest", "forest_depths")
        .with_choice("Return to the crossroads", "start"),
        StoryNode::new(
            "forest_exit",
            "Emerging Renewed\n\n\
             You step back into sunlight, carrying the forest's silence with you.",
        )
        .with_mood("peaceful")
        .with_image_prompt("traveller leaving a dark forest into sunlight")
        .with_choice("Return to the crossroads", "start"),
        StoryNode::new(
            "key_taken",
            "Ending: The Heart's Compass\n\n\
             Behind a waterfall the key opens a chest. Inside, a compass points \
             wherever your heart wishes to go.",
        )
        .with_mood("fulfilling")
        .with_image_prompt("glowing compass in an open chest behind a waterfall")
        .with_achievement("true-north-of-the-heart"),
        StoryNode::new(
            "lighthouse_path",
            "Ending: Guardian of the Storm\n\n\
             The old keeper hands you her lantern. You watch over the sea for \
             generations to come.",
        )
        .with_mood("epic")
        .with_image_prompt("lighthouse keeper holding a lantern against a gale")
        .with_achievement("keeper-of-the-light"),
        StoryNode::new(
            "undersea_library",
            "Ending: Keeper of Stories\n\n\
             At low tide a crystal door opens onto endless shelves of untold tales. \
             You become their guardian.",
        )
        .with_mood("wonderous")
        .with_image_prompt("crystal library under the sea, floating books")
        .with_achievement("librarian-of-lost-tales"),
        StoryNode::new(
            "village_market",
            "Ending: Simple Joys\n\n\
             You trade the map for spices and a warm meal, and find your adventure \
             in good company.",
        )
        .with_mood("content")
        .with_image_prompt("bustling fantasy market at dusk")
        .with_achievement("master-of-the-present-moment"),
        StoryNode::new(
            "forest_depths",
            "Ending: Discoverer of Ruins\n\n\
             The stag's ward unlocks overgrown ruins full of manuscripts that rewrite history.",
        )
        .with_mood("discovery")
        .with_image_prompt("overgrown ruins with glowing manuscripts")
        .with_achievement("archaeologist-of-the-arcane"),
    ];

    StoryTree::builder("start").nodes(nodes).build()
}
