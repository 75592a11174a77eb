//! Application constants for the CEDEN refresh
//!
//! This module contains the QA code tables, column names, default values
//! and analyte lists used throughout the refresh.

// =============================================================================
// Column Name Constants
// =============================================================================

/// Column names referenced by the enrichment and classification rules
pub mod columns {
    pub const STATION_CODE: &str = "StationCode";
    pub const STATION_NAME: &str = "StationName";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
    pub const DATUM: &str = "Datum";
    pub const SAMPLE_DATE: &str = "SampleDate";
    pub const RESULT: &str = "Result";
    pub const QA_CODE: &str = "QACode";
    pub const RESULT_QUAL_CODE: &str = "ResultQualCode";
    pub const RES_QUAL_CODE: &str = "ResQualCode";
    pub const ANALYTE: &str = "Analyte";
    pub const ANALYTE_NAME: &str = "AnalyteName";

    // Columns appended to every classified output row
    pub const DATA_QUALITY: &str = "DataQuality";
    pub const DATA_QUALITY_INDICATOR: &str = "DataQualityIndicator";

    /// Site directory header, in output order
    pub const SITE_HEADER: &[&str] = &["StationName", "SiteCode", "Latitude", "Longitude", "Datum"];
}

/// Prefix rewritten in extracted column names (`TargetLatitude` -> `Latitude`)
pub const TARGET_COLUMN_PREFIX: &str = "TargetL";

/// Replacement for [`TARGET_COLUMN_PREFIX`]
pub const TARGET_COLUMN_REPLACEMENT: &str = "L";

// =============================================================================
// Enrichment Constants
// =============================================================================

/// Datum written when the station has no recorded datum
pub const DATUM_NOT_RECORDED: &str = "NR";

/// Value substituted when a numeric column does not parse
pub const NUMERIC_SENTINEL: &str = "NaN";

/// Exclusive upper bound for longitudes that get their sign flipped
pub const LONGITUDE_FLIP_LIMIT: f64 = 10_000.0;

/// Characters stripped from every value on top of non-printable ones
pub const STRIPPED_CHARACTERS: &[char] = &['|', '"', '\t', '\r', '\n', '\x0b', '\x0c'];

/// Bucket files at or below this size are treated as header-only and removed
pub const DEFAULT_MIN_BUCKET_BYTES: u64 = 2000;

/// Year before which DNQ qualified results are rejected
pub const DNQ_REJECT_BEFORE_YEAR: i32 = 2008;

/// Default first year for yearly buckets
pub const DEFAULT_FIRST_YEAR: i32 = 2000;

/// Label prefix for yearly buckets
pub const YEAR_BUCKET_PREFIX: &str = "year-";

/// Stem of the combined site directory written after a run
pub const ALL_SITES_STEM: &str = "All_CEDEN_Sites";

/// Manifest written to the output directory
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Progress reporting update interval (number of processed records)
pub const PROGRESS_UPDATE_INTERVAL: u64 = 5000;

// =============================================================================
// Classification Patterns
// =============================================================================

/// Station code token marking non-project QA samples (substring match)
pub const NON_PROJECT_STATION_PATTERN: &str = "000NONPJ";

/// Analyte names matching this pattern are surrogate spikes
pub const SURROGATE_PATTERN: &str = "[Ss]urrogate";

/// Indicator used when a reject comes from the DNQ/ND qualifier rules
pub const SPECIAL_RULES_INDICATOR: &str = "ResultQualCode Special Rules";

/// Separator between indicator fragments
pub const INDICATOR_SEPARATOR: &str = "; ";

// =============================================================================
// QA Code Tables
// =============================================================================

/// Severity tables per code column
///
/// 0: QC record, 1: passed QC, 2: needs some review, 3: spatial accuracy
/// unknown, 4: needs extensive review, 5: unknown data quality, 6: reject.
pub mod code_tables {
    pub const QA_CODE: &[(&str, u8)] = &[
        ("AWM", 1), ("AY", 2), ("BB", 2), ("BBM", 2), ("BCQ", 1), ("BE", 2), ("BH", 1),
        ("BLM", 4), ("BRKA", 2), ("BS", 2), ("BT", 6), ("BV", 2), ("BX", 4), ("BY", 4),
        ("BZ", 4), ("BZ15", 2), ("C", 1), ("CE", 4), ("CIN", 2), ("CJ", 2), ("CNP", 2),
        ("CQA", 1), ("CS", 2), ("CSG", 2), ("CT", 2), ("CVH", 1), ("CVHB", 4), ("CVL", 1),
        ("CVLB", 4), ("CZM", 2), ("D", 1), ("DB", 2), ("DBLOD", 2), ("DBM", 2), ("DF", 2),
        ("DG", 1), ("DO", 1), ("DRM", 2), ("DS", 1), ("DT", 1), ("ERV", 4), ("EUM", 4),
        ("EX", 4), ("F", 2), ("FCL", 2), ("FDC", 2), ("FDI", 2), ("FDO", 6), ("FDP", 2),
        ("FDR", 1), ("FDS", 1), ("FEU", 6), ("FIA", 6), ("FIB", 4), ("FIF", 6), ("FIO", 4),
        ("FIP", 4), ("FIT", 2), ("FIV", 6), ("FLV", 2), ("FNM", 6), ("FO", 2), ("FS", 6),
        ("FTD", 6), ("FTT", 6), ("FUD", 6), ("FX", 4), ("GB", 2), ("GBC", 4), ("GC", 1),
        ("GCA", 1), ("GD", 1), ("GN", 4), ("GR", 4), ("H", 2), ("H22", 4), ("H24", 4),
        ("H8", 2), ("HB", 2), ("HD", 4), ("HH", 2), ("HNO2", 2), ("HR", 1), ("HS", 4),
        ("HT", 1), ("IE", 2), ("IF", 2), ("IL", 4), ("ILM", 2), ("ILN", 2), ("ILO", 2),
        ("IM", 2), ("IP", 4), ("IP5", 4), ("IPMDL2", 4), ("IPMDL3", 4), ("IPRL", 4),
        ("IS", 4), ("IU", 4), ("IZM", 2), ("J", 2), ("JA", 2), ("JDL", 2), ("LB", 2),
        ("LC", 4), ("LRGN", 6), ("LRIL", 6), ("LRIP", 6), ("LRIU", 6), ("LRJ", 6),
        ("LRJA", 6), ("LRM", 6), ("LRQ", 6), ("LST", 6), ("M", 2), ("MAL", 1), ("MN", 4),
        ("N", 2), ("NAS", 2), ("NBC", 2), ("NC", 1), ("NG", 1), ("NMDL", 1), ("None", 1),
        ("NR", 5), ("NRL", 1), ("NTR", 1), ("OA", 2), ("OV", 2), ("P", 4), ("PG", 4),
        ("PI", 4), ("PJ", 1), ("PJM", 1), ("PJN", 1), ("PP", 4), ("PRM", 4), ("Q", 4),
        ("QAX", 1), ("QG", 4), ("R", 6), ("RE", 1), ("REL", 1), ("RIP", 6), ("RIU", 6),
        ("RJ", 6), ("RLST", 6), ("RPV", 4), ("RQ", 2), ("RU", 4), ("RY", 4), ("SC", 1),
        ("SCR", 2), ("SLM", 1), ("TA", 4), ("TAC", 1), ("TC", 4), ("TCI", 4), ("TCT", 4),
        ("TD", 4), ("TH", 4), ("THS", 4), ("TK", 4), ("TL", 2), ("TNC", 2), ("TNS", 1),
        ("TOQ", 4), ("TP", 4), ("TR", 6), ("TS", 4), ("TW", 2), ("UF", 2), ("UJ", 2),
        ("UKM", 4), ("ULM", 4), ("UOL", 2), ("VCQ", 2), ("VQN", 2), ("VC", 2), ("VBB", 2),
        ("VBS", 2), ("VBY", 4), ("VBZ", 4), ("VBZ15", 2), ("VCJ", 2), ("VCO", 2),
        ("VCR", 2), ("VD", 1), ("VDO", 1), ("VDS", 1), ("VELB", 1), ("VEUM", 4),
        ("VFDP", 2), ("VFIF", 6), ("VFNM", 6), ("VFO", 2), ("VGB", 2), ("VGBC", 4),
        ("VGN", 4), ("VH", 2), ("VH24", 4), ("VH8", 2), ("VHB", 2), ("VIE", 2), ("VIL", 4),
        ("VILN", 4), ("VILO", 2), ("VIP", 4), ("VIP5", 4), ("VIPMDL2", 4), ("VIPMDL3", 4),
        ("VIPRL", 4), ("VIS", 4), ("VIU", 4), ("VJ", 2), ("VJA", 2), ("VLB", 2),
        ("VLMQO", 2), ("VM", 2), ("VNBC", 2), ("VNC", 1), ("VNMDL", 1), ("VNTR", 1),
        ("VPJM", 1), ("VPMQO", 2), ("VQAX", 1), ("VQCA", 4), ("VQCP", 4), ("VR", 6),
        ("VRBS", 6), ("VRBZ", 6), ("VRDO", 6), ("VRE", 1), ("VREL", 1), ("VRGN", 6),
        ("VRIL", 6), ("VRIP", 6), ("VRIU", 6), ("VRJ", 6), ("VRLB", 6), ("VRLST", 6),
        ("VRQ", 2), ("VRVQ", 6), ("VS", 2), ("VSC", 1), ("VSCR", 2), ("VSD3", 1),
        ("VTAC", 1), ("VTCI", 4), ("VTCT", 4), ("VTNC", 2), ("VTOQ", 4), ("VTR", 6),
        ("VTW", 4), ("VVQ", 6), ("WOQ", 4),
    ];

    pub const BATCH_VERIFICATION: &[(&str, u8)] = &[
        ("NA", 5), ("NR", 5), ("VAC", 1), ("VAC,VCN", 6), ("VAC,VMD", 2), ("VAC,VMD,VQI", 4),
        ("VAC,VQI", 4), ("VAC,VR", 6), ("VAF", 1), ("VAF,VMD", 2), ("VAF,VQI", 4), ("VAP", 1),
        ("VAP,VI", 4), ("VAP,VQI", 4), ("VCN", 6), ("VLC", 1), ("VLC,VMD", 2),
        ("VLC,VMD,VQI", 4), ("VLC,VQI", 4), ("VLF", 1), ("VMD", 2), ("VQI", 4),
        ("VQI,VTC", 4), ("VQN", 5), ("VR", 6), ("VTC", 2),
    ];

    pub const RESULT_QUAL_CODE: &[(&str, u8)] = &[
        ("/oC", 4), ("<", 1), ("<=", 1), ("=", 1), (">", 1), (">=", 1), ("A", 1), ("CG", 4),
        ("COL", 1), ("DNQ", 2), ("JF", 1), ("NA", 6), ("ND", 1), ("NR", 6), ("NRS", 6),
        ("NRT", 6), ("NSI", 1), ("P", 1), ("PA", 1), ("w/C", 4), ("", 1),
        ("Systematic Contamination", 4),
    ];

    pub const LATITUDE: &[(&str, u8)] = &[("-88", 0), ("", 6), ("0.0", 6)];

    pub const RESULT: &[(&str, u8)] = &[("", 1)];

    pub const STATION_CODE: &[(&str, u8)] = &[
        ("LABQA", 0), ("LABQA_SWAMP", 0), ("000NONPJ", 0), ("FIELDQA", 0),
        ("Non Project QA Sample", 0), ("Laboratory QA Sample", 0), ("Field QA sample", 0),
        ("FIELDQA SWAMP", 0), ("000NONSW", 0), ("FIELDQA_SWAMP", 0),
    ];

    pub const SAMPLE_TYPE_CODE: &[(&str, u8)] = &[
        ("LabBlank", 0), ("CompBLDup", 0), ("LCS", 0), ("CRM", 0), ("FieldBLDup_Grab", 0),
        ("FieldBLDup_Int", 0), ("FieldBLDup", 0), ("FieldBlank", 0), ("TravelBlank", 0),
        ("EquipBlank", 0), ("DLBlank", 0), ("FilterBlank", 0), ("MS1", 0), ("MS2", 0),
        ("MS3", 0), ("MSBLDup", 0),
    ];

    pub const SAMPLE_DATE: &[(&str, u8)] = &[("Jan  1 1950 12:00AM", 0)];

    pub const PROGRAM_NAME: &[(&str, u8)] = &[];

    pub const ANALYTE: &[(&str, u8)] = &[("Surrogate", 0)];

    pub const MATRIX_NAME: &[(&str, u8)] = &[
        ("blankwater", 0), ("Blankwater", 0), ("labwater", 0), ("blankmatrix", 0),
    ];

    pub const REPLICATE: &[(&str, u8)] = &[
        ("0", 1), ("1", 1), ("2", 0), ("3", 0), ("4", 0), ("5", 0), ("6", 0), ("7", 0), ("8", 0),
    ];

    pub const DATUM: &[(&str, u8)] = &[("NR", 3)];

    /// Base registry layout: field name and its table, in evaluation order
    pub const BASE_FIELDS: &[(&str, &[(&str, u8)])] = &[
        ("QACode", QA_CODE),
        ("BatchVerification", BATCH_VERIFICATION),
        ("ResultQualCode", RESULT_QUAL_CODE),
        ("Latitude", LATITUDE),
        ("Result", RESULT),
        ("StationCode", STATION_CODE),
        ("SampleTypeCode", SAMPLE_TYPE_CODE),
        ("SampleDate", SAMPLE_DATE),
        ("ProgramName", PROGRAM_NAME),
        ("Analyte", ANALYTE),
        ("MatrixName", MATRIX_NAME),
        ("CollectionReplicate", REPLICATE),
        ("ResultsReplicate", REPLICATE),
        ("Datum", DATUM),
    ];
}

// =============================================================================
// Numeric Coercion Defaults
// =============================================================================

/// Columns coerced to floating point per dataset kind
pub mod numeric_fields {
    pub const WATER_CHEMISTRY: &[&str] = &[
        "CollectionDepth", "CollectionReplicate", "ResultsReplicate", "Result", "MDL", "RL",
        "Latitude", "Longitude", "DilutionFactor", "ExpectedValue", "DistanceFromBank",
        "StreamWidth", "StationWaterDepth",
    ];

    pub const BENTHIC: &[&str] = &[
        "Latitude", "Longitude", "CollectionReplicate", "DistinctOrganism", "Counts",
        "CollectionDepth", "GrabSize", "PercentSampleCounted", "TotalGridsGridsAnalyzed",
        "GridsVolumeAnalyzed", "TargetOrganismCount", "ActualOrganismCount",
        "ExtraOrganismCount", "QCOrganismCount", "DiscardedOrganismCount",
    ];

    pub const TOXICITY: &[&str] = &[
        "CollectionDepth", "CollectionReplicate", "LabReplicate", "Result", "Latitude",
        "Longitude", "Dilution", "TreatmentConcentration", "DistanceFromBank", "StreamWidth",
        "StationWaterDepth", "PctControl", "RepCount", "Mean", "StdDev", "Alphalevel",
        "EvalThreshold", "MSD", "CalculatedValue", "PercentEffect",
    ];

    pub const TISSUE: &[&str] = &[
        "Latitude", "Longitude", "NumberFishperComp", "CompositeReplicate", "ResultReplicate",
        "Result", "MDL", "RL", "DilutionFactor", "WeightAvg(g)", "TLMax(mm)",
        "TLAvgLength(mm)", "CompSizeCheck", "SampleDateRange(Days)", "CollectionReplicate",
        "TotalCount", "ForkLength", "TotalLength", "OrganismWeight", "TissueWeight",
        "CompositeWeight", "TLMin(mm)",
    ];

    pub const HABITAT: &[&str] = &[
        "CollectionReplicate", "Latitude", "Longitude", "DistanceFromBank", "StreamWidth",
        "StationWaterDepth",
    ];
}

// =============================================================================
// Analyte Subsets
// =============================================================================

/// Allow-lists for the built-in topic extracts
pub mod analytes {
    /// Pathogen indicators used for the Safe To Swim extract
    pub const SAFE_TO_SWIM: &[&str] = &[
        "E. coli", "Enterococcus", "Coliform, Total", "Coliform, Fecal",
    ];

    /// Pesticides and degradates used for the Pesticides extract
    pub const PESTICIDES: &[&str] = &[
        "Acetamiprid", "Acibenzolar-S-methyl", "Aldicarb", "Aldicarb ", "Aldicarb Sulfone",
        "Aldicarb Sulfoxide", "Aldrin", "Aldrin, Particulate", "Allethrin", "Ametryn",
        "Aminocarb", "AMPA", "Anilazine", "Aspon", "Atraton", "Atrazine", "Azinphos Ethyl",
        "Azinphos Methyl", "Azoxystrobin", "Barban", "Bendiocarb", "Benfluralin", "Benomyl",
        "Bensulfuron Methyl", "Bentazon", "Bifenox", "Bifenthrin", "Bispyribac Sodium",
        "Bolstar", "Bromacil", "Captafol", "Captan", "Carbaryl", "Carbendazim", "Carbofuran",
        "Carbophenothion", "Carfentrazone Ethyl", "Chlorantraniliprole", "Chlordane",
        "Chlordane, cis-", "Chlordane, cis-, Particulate", "Chlordane, Technical",
        "Chlordane, trans-", "Chlordane, trans-, Particulate", "Chlordene, cis-",
        "Chlordene, trans-", "Chlorfenapyr", "Chlorfenvinphos", "Chlorobenzilate",
        "Chlorothalonil", "Chlorpropham", "Chlorpyrifos", "Chlorpyrifos Methyl",
        "Chlorpyrifos Methyl, Particulate", "Chlorpyrifos Methyl/Fenchlorphos",
        "Chlorpyrifos, Particulate", "Cinerin-2", "Ciodrin", "Clomazone", "Clothianidin",
        "Coumaphos", "Cyanazine", "Cyantraniliprole", "Cycloate", "Cyfluthrin",
        "Cyfluthrin, beta-", "Cyfluthrin-1", "Cyfluthrin-2", "Cyfluthrin-3", "Cyfluthrin-4",
        "Cyhalofop-butyl", "Cyhalothrin", "Cyhalothrin lambda-", "Cyhalothrin, gamma-",
        "Cyhalothrin, lambda-1", "Cyhalothrin, lambda-2", "Cypermethrin", "Cypermethrin-1",
        "Cypermethrin-2", "Cypermethrin-3", "Cypermethrin-4", "Cyprodinil", "Dacthal",
        "Dacthal, Particulate", "DCBP(p,p')", "DDD(o,p')", "DDD(o,p'), Particulate",
        "DDD(p,p')", "DDD(p,p'), Particulate", "DDE(o,p')", "DDE(o,p'), Particulate",
        "DDE(p,p')", "DDE(p,p'), Particulate", "DDMU(p,p')", "DDMU(p,p'), Particulate",
        "DDT(o,p')", "DDT(o,p'), Particulate", "DDT(p,p')", "DDT(p,p'), Particulate",
        "Deltamethrin", "Deltamethrin/Tralomethrin", "Demeton", "Demeton-O", "Demeton-s",
        "Desethyl-Atrazine", "Desisopropyl-Atrazine", "Diazinon", "Diazinon, Particulate",
        "Dichlofenthion", "Dichlone", "Dichloroaniline, 3,5-", "Dichlorobenzenamine, 3,4-",
        "Dichlorophenyl Urea, 3,4-", "Dichlorophenyl-3-methyl Urea, 3,4-", "Dichlorvos",
        "Dichrotophos", "Dicofol", "Dicrotophos", "Dieldrin", "Dieldrin, Particulate",
        "Diflubenzuron", "Dimethoate", "Dioxathion", "Diphenamid", "Diphenylamine", "Diquat",
        "Disulfoton", "Dithiopyr", "Diuron", "Endosulfan I", "Endosulfan I, Particulate",
        "Endosulfan II", "Endosulfan II, Particulate", "Endosulfan Sulfate",
        "Endosulfan Sulfate, Particulate", "Endrin", "Endrin Aldehyde", "Endrin Ketone",
        "Endrin, Particulate", "EPN", "EPTC", "Esfenvalerate", "Esfenvalerate/Fenvalerate",
        "Esfenvalerate/Fenvalerate-1", "Esfenvalerate/Fenvalerate-2", "Ethafluralin",
        "Ethion", "Ethoprop", "Famphur", "Fenamiphos", "Fenchlorphos", "Fenhexamid",
        "Fenitrothion", "Fenpropathrin", "Fensulfothion", "Fenthion", "Fenuron",
        "Fenvalerate", "Fipronil", "Fipronil Amide", "Fipronil Desulfinyl",
        "Fipronil Desulfinyl Amide", "Fipronil Sulfide", "Fipronil Sulfone", "Flonicamid",
        "Fluometuron", "Fluridone", "Flusilazole", "Fluvalinate", "Fluxapyroxad", "Folpet",
        "Fonofos", "Glyphosate", "Halosulfuron Methyl", "HCH, alpha-",
        "HCH, alpha-, Particulate", "HCH, beta-", "HCH, beta-, Particulate", "HCH, delta-",
        "HCH, delta-, Particulate", "HCH, gamma-", "HCH, gamma-, Particulate", "Heptachlor",
        "Heptachlor Epoxide", "Heptachlor Epoxide, Particulate",
        "Heptachlor Epoxide/Oxychlordane", "Heptachlor Epoxide/Oxychlordane, Particulate",
        "Heptachlor, Particulate", "Hexachlorobenzene", "Hexachlorobenzene, Particulate",
        "Hexazinone", "Hydroxyatrazine, 2-", "Hydroxycarbofuran, 3- ", "Hydroxypropanal, 3-",
        "Imazalil", "Indoxacarb", "Isofenphos", "Isoxaben", "Jasmolin-2", "Kepone",
        "Ketocarbofuran, 3-", "Leptophos", "Linuron", "Malathion", "Merphos",
        "Methamidophos", "Methidathion", "Methiocarb", "Methomyl", "Methoprene",
        "Methoxychlor", "Methoxychlor, Particulate", "Methoxyfenozide",
        "Methyl (3,4-dichlorophenyl)carbamate", "Mevinphos", "Mexacarbate", "Mirex",
        "Mirex, Particulate", "Molinate", "Monocrotophos", "Monuron", "Naled", "Neburon",
        "Nonachlor, cis-", "Nonachlor, cis-, Particulate", "Nonachlor, trans-",
        "Nonachlor, trans-, Particulate", "Norflurazon", "Oxadiazon",
        "Oxadiazon, Particulate", "Oxamyl", "Oxychlordane", "Oxychlordane, Particulate",
        "Oxyfluorfen", "Paraquat", "Parathion, Ethyl", "Parathion, Methyl", "PCNB",
        "Pebulate", "Pendimethalin", "Penoxsulam", "Permethrin", "Permethrin, cis-",
        "Permethrin, trans-", "Perthane", "Phenothrin", "Phorate", "Phosalone", "Phosmet",
        "Phosphamidon", "Piperonyl Butoxide", "Pirimiphos Methyl", "PrAllethrin",
        "Procymidone", "Profenofos", "Profluralin", "Prometon", "Prometryn", "Propachlor",
        "Propanil", "Propargite", "Propazine", "Propham", "Propoxur", "Pymetrozin",
        "Pyrethrin-2", "Pyrimethanil", "Quinoxyfen", "Resmethrin", "Safrotin", "Secbumeton",
        "Siduron", "Simazine", "Simetryn", "Sulfallate", "Sulfotep", "Tebuthiuron", "Tedion",
        "Terbufos", "Terbuthylazine", "Terbutryn", "Tetrachloro-m-xylene",
        "Tetrachlorvinphos", "Tetraethyl Pyrophosphate", "Tetramethrin", "T-Fluvalinate",
        "Thiamethoxam", "Thiobencarb", "Thionazin", "Tokuthion", "Total DDDs", "Total DDEs",
        "Total DDTs", "Total HCHs", "Total Pyrethrins", "Toxaphene", "Tralomethrin",
        "Tributyl Phosphorotrithioate, S,S,S-", "Trichlorfon", "Trichloronate", "Triclopyr",
        "Tridimephon", "Vinclozolin",
    ];
}
