//! Static attribute-name table.
//!
//! Entity-map attributes are identified on the wire by a 32-bit name hash.
//! The table below maps every hash the game server is known to send to the
//! field name used in entity ticks. It is built once and never mutated.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Known `(name hash, field name)` pairs.
pub const FIELD_NAMES: &[(u32, &str)] = &[
    (3_965_757_274, "Name"),
    (2_045_070_744, "Position"),
    (2_112_680_891, "Scale"),
    (1_899_079_302, "EntityClass"),
    (3_370_100_680, "ModelHash"),
    (338_163_296, "Yaw"),
    (2_038_511_229, "InterpolatedYaw"),
    (396_231_043, "AimingYaw"),
    (2_232_061_803, "Health"),
    (3_411_739_057, "MaxHealth"),
    (1_658_281_879, "Energy"),
    (2_837_959_133, "MaxEnergy"),
    (664_883_256, "ReconnectSecret"),
    (2_228_735_555, "Score"),
    (1_998_601_136, "Armor"),
    (537_809_156, "SpeedAttribute"),
    (1_166_125_470, "Damage"),
    (463_881_754, "AvailableSkillPoints"),
    (1_419_758_453, "CollisionRadius"),
    (2_789_835_959, "Width"),
    (4_139_697_398, "Height"),
    (164_904_981, "Level"),
    (2_065_533_638, "Kills"),
    (487_111_411, "Dead"),
    (1_776_350_289, "TimeAlive"),
    (1_168_516_394, "EntityMap"),
    (1_134_913_306, "NextPooledTick"),
    (3_940_594_818, "deathTick"),
    (2_460_616_447, "firingTick"),
    (1_325_424_963, "firingSequence"),
    (2_883_383_757, "lastDamagedTick"),
    (129_999_719, "equippedCategoryId"),
    (1_506_661_530, "equippedDataIndex"),
    (3_284_448_976, "equippedTier"),
    (2_076_321_484, "equippedInventorySlot"),
    (1_364_116_198, "equippedSkinId"),
    (3_044_274_584, "shield"),
    (4_223_951_838, "maxShield"),
    (9_937_773, "healthDamageTaken"),
    (3_707_014_400, "shieldDamageTaken"),
    (1_804_627_392, "effect"),
    (2_650_249_996, "knockDowns"),
    (1_205_522_264, "currentAmmo"),
    (1_767_079_171, "maxAmmo"),
    (1_312_790_758, "smallAmmo"),
    (4_117_515_090, "mediumAmmo"),
    (3_527_174_458, "largeAmmo"),
    (752_369_509, "shotgunAmmo"),
    (2_516_899_740, "wood"),
    (4_272_078_913, "startChargingTick"),
    (3_740_327_455, "startChargeUpTick"),
    (1_657_309_942, "reloadStartedTick"),
    (4_095_913_789, "reloadEndsTick"),
    (2_391_951_737, "actionStartedTick"),
    (3_013_078_650, "actionEndsTick"),
    (1_854_863_057, "cockingMsRemaining"),
    (4_081_874_656, "canParachute"),
    (1_987_892_684, "parachuteStartedTick"),
    (2_426_740_830, "parachuteMsRemaining"),
    (34_162_050, "isFreefalling"),
    (1_918_353_449, "emoteIndex"),
    (3_821_095_497, "emoteIndex2"),
    (3_239_833_222, "emoteTick"),
    (570_200_045, "parachuteId"),
    (957_099_820, "bodyId"),
    (2_724_486_410, "backpackId"),
    (4_127_365_483, "fistSkinId"),
    (2_948_797_259, "spectatingUid"),
    (1_918_570_631, "spectateCount"),
    (2_666_157_490, "partyId"),
    (1_803_613_228, "partyColor"),
    (2_950_326_362, "reviveStartedTick"),
    (1_859_733_209, "reviveEndsTick"),
    (1_553_612_668, "isKnockedDown"),
    (918_024_898, "knockedDownHealth"),
    (3_724_070_810, "knockedDownMaxHealth"),
    (910_088_174, "isOnFire"),
    (3_980_301_664, "isPoisoned"),
    (2_173_100_889, "isSlowed"),
    (1_069_949_249, "isHealing"),
    (1_004_238_105, "isInWater"),
    (728_513_717, "isInBuildingMode"),
    (4_223_896_640, "zombieKills"),
    (1_349_887_677, "movementSpeedAffinityRocks"),
    (139_502_709, "defenseAffinityRocks"),
    (733_149_254, "bulletDamageAffinityRocks"),
    (1_445_646_640, "bulletSpeedAffinityRocks"),
    (2_256_189_882, "portalEnterTick"),
    (1_779_994_739, "isGrappling"),
    (3_115_359_844, "isVip"),
    (444_524_105, "isBoosted"),
    (4_209_796_065, "lastBulletDataIndex"),
    (3_076_225_077, "lastBulletLifetimePercent"),
    (2_653_271_241, "grapplingHookPosition"),
    (1_775_539_923, "vehicleUid"),
    (1_184_607_771, "vehicleSlot"),
    (2_034_799_789, "equippedModifierIndex"),
    (3_257_708_849, "obtainableUids"),
    (2_096_278_210, "interactableUids"),
    (485_783_130, "visibleBuildingUids"),
    (471_584_441, "dataIndex"),
    (441_901_997, "collisionUid"),
    (2_729_366_668, "ownerUid"),
    (3_886_314_514, "trailId"),
    (3_423_242_791, "trailColorId"),
    (2_549_878_347, "creationTick"),
    (2_089_316_765, "stuckAtTick"),
    (2_636_873_287, "effectiveLifetimeMs"),
    (3_540_988_168, "categoryId"),
    (124_913_137, "tier"),
    (3_866_926_138, "quantity"),
    (2_240_057_735, "skinId"),
    (3_707_506_636, "modifierIndex"),
    (2_900_975_594, "weaponKills"),
    (145_240_268, "currentCircleRadius"),
    (1_245_424_964, "nextCircleRadius"),
    (2_941_477_767, "lastCircleRadius"),
    (3_318_715_651, "currentCirclePosition"),
    (3_095_156_091, "nextCirclePosition"),
    (3_256_293_950, "lastCirclePosition"),
    (291_542_999, "currentCircleTick"),
    (1_489_880_305, "openDoorIds"),
    (956_693_851, "openDoorDirections"),
    (2_730_579_844, "brokenWindowIds"),
    (1_574_999_092, "sprayIndex"),
    (2_201_028_498, "airDropLandTick"),
    (791_445_081, "vehicleOccupants"),
];

fn by_hash() -> &'static HashMap<u32, &'static str> {
    static TABLE: OnceLock<HashMap<u32, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| FIELD_NAMES.iter().copied().collect())
}

fn by_name() -> &'static HashMap<&'static str, u32> {
    static TABLE: OnceLock<HashMap<&'static str, u32>> = OnceLock::new();
    TABLE.get_or_init(|| FIELD_NAMES.iter().map(|&(hash, name)| (name, hash)).collect())
}

/// Looks up the field name for an attribute name hash.
#[must_use]
pub fn field_name(hash: u32) -> Option<&'static str> {
    by_hash().get(&hash).copied()
}

/// Looks up the name hash for a known field name.
#[must_use]
pub fn name_hash(name: &str) -> Option<u32> {
    by_name().get(name).copied()
}

/// Returns the field name for `hash`, falling back to its decimal string.
#[must_use]
pub fn resolve_field_name(hash: u32) -> String {
    field_name(hash).map_or_else(|| hash.to_string(), str::to_string)
}
